//! Element proxies.
//!
//! An [`ElementProxy`] is the only handle flows get to a page element. Its
//! [`AccessMode`] decides which writes go through:
//!
//! - `Static` proxies snapshot their element at creation and refuse every
//!   write.
//! - `UserEditable` proxies refuse value writes but allow everything else.
//! - `Programmable` proxies route value writes through the safe setter.
//!
//! Behaviour (`click`, `focus`, `blur`, `scroll_into_view`, `touch`) is
//! available in every mode.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tracing::{debug, trace};
use uuid::Uuid;

use crate::dom::{Node, WeakNode};
use crate::error::{Error, Result};
use crate::events::Debounce;
use crate::reactor::Shared;

use super::factory;
use super::mode::{AccessMode, QueryMode};
use super::query::{SelectorSpec, StyleMap, indexed_name};
use super::setter;

// ============================================================================
// Types
// ============================================================================

/// Element state captured when a static proxy is created.
#[derive(Debug, Clone)]
struct Snapshot {
    value: Option<String>,
    checked: bool,
    disabled: bool,
    text_content: String,
    tab_index: i32,
    spellcheck: bool,
}

impl Snapshot {
    fn of(node: &Node) -> Self {
        Self {
            value: node.value(),
            checked: node.checked(),
            disabled: node.disabled(),
            text_content: node.text_content(),
            tab_index: node.tab_index(),
            spellcheck: node.spellcheck(),
        }
    }
}

/// Internal shared state for a proxy.
pub(crate) struct ProxyInner {
    /// Unique identifier for this proxy.
    uuid: Uuid,
    /// Display name, e.g. `Headline_1`.
    name: String,
    /// Name the display name was derived from, e.g. `Headline`.
    base: String,
    /// Access mode, fixed at creation.
    mode: AccessMode,
    /// The proxied element. Cached proxies must not keep it alive.
    node: WeakNode,
    /// Spec that finds this element again.
    fresh: SelectorSpec,
    /// Frozen state of static proxies.
    snapshot: Option<Snapshot>,
    /// Debounce gate of touches.
    touch_gate: Debounce,
    /// Page services.
    pub(crate) shared: Arc<Shared>,
}

// ============================================================================
// ElementProxy
// ============================================================================

/// Restricted handle to one page element.
///
/// Cloning returns another handle to the same proxy. Equality and hashing
/// use proxy identity.
#[derive(Clone)]
pub struct ElementProxy {
    pub(crate) inner: Arc<ProxyInner>,
}

impl fmt::Debug for ElementProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementProxy")
            .field("uuid", &self.inner.uuid)
            .field("name", &self.inner.name)
            .field("mode", &self.inner.mode)
            .field("node", &self.inner.node)
            .finish_non_exhaustive()
    }
}

/// `Name_1: value`.
impl fmt::Display for ElementProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}",
            self.inner.name,
            self.value().unwrap_or_default()
        )
    }
}

impl PartialEq for ElementProxy {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for ElementProxy {}

impl Hash for ElementProxy {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.uuid.hash(state);
    }
}

// ============================================================================
// ElementProxy - Constructor
// ============================================================================

impl ElementProxy {
    /// Creates a proxy for `node`, displayed as `base` suffixed with `idx`.
    pub(crate) fn new(
        shared: Arc<Shared>,
        node: &Node,
        base: &str,
        idx: usize,
        mode: AccessMode,
        fresh: SelectorSpec,
    ) -> Self {
        let uuid = Uuid::new_v4();
        let name = indexed_name(base, idx);
        let snapshot = mode.is_static().then(|| Snapshot::of(node));
        debug!(uuid = %uuid, name = %name, mode = %mode, node = %node.describe(), "Proxy created");

        let touch_gate = Debounce::new(shared.config.debounce());
        Self {
            inner: Arc::new(ProxyInner {
                uuid,
                name,
                base: base.to_string(),
                mode,
                node: node.downgrade(),
                fresh,
                snapshot,
                touch_gate,
                shared,
            }),
        }
    }
}

// ============================================================================
// ElementProxy - Accessors
// ============================================================================

impl ElementProxy {
    /// Returns the unique UUID.
    #[inline]
    #[must_use]
    pub fn uuid(&self) -> &Uuid {
        &self.inner.uuid
    }

    /// Returns the display name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns the access mode.
    #[inline]
    #[must_use]
    pub fn mode(&self) -> AccessMode {
        self.inner.mode
    }

    /// Returns the underlying element, `None` once it has been dropped.
    ///
    /// Writes through this handle bypass the access policy.
    #[inline]
    #[must_use]
    pub fn node(&self) -> Option<Node> {
        self.inner.node.upgrade()
    }

    /// Returns the weak handle to the element.
    #[inline]
    pub(crate) fn weak_node(&self) -> &WeakNode {
        &self.inner.node
    }

    /// Returns the spec that finds this element again.
    #[inline]
    #[must_use]
    pub fn fresh_spec(&self) -> &SelectorSpec {
        &self.inner.fresh
    }

    /// Fails unless the proxy accepts writes.
    fn ensure_mutable(&self, property: &'static str) -> Result<()> {
        if self.inner.mode.is_static() {
            return Err(Error::static_proxy(self.inner.name.as_str(), property));
        }
        Ok(())
    }

    /// Runs `f` on the element unless it has been dropped.
    fn with_node(&self, f: impl FnOnce(&Node)) {
        match self.node() {
            Some(node) => f(&node),
            None => trace!(name = %self.inner.name, "Proxied element dropped"),
        }
    }
}

// ============================================================================
// ElementProxy - Properties
// ============================================================================

impl ElementProxy {
    /// Current value; the snapshot for static proxies.
    #[must_use]
    pub fn value(&self) -> Option<String> {
        match &self.inner.snapshot {
            Some(snapshot) => snapshot.value.clone(),
            None => self.node().and_then(|node| node.value()),
        }
    }

    /// Sets the value through the safe setter.
    ///
    /// # Errors
    ///
    /// - [`Error::StaticProxy`] for static proxies
    /// - [`Error::NotProgrammable`] for user-editable proxies
    /// - [`Error::UnsupportedElementType`] if the element does not hold an
    ///   editable value
    pub fn set_value(&self, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        match self.inner.mode {
            AccessMode::Static => Err(Error::static_proxy(self.inner.name.as_str(), "value")),
            AccessMode::UserEditable => Err(Error::not_programmable(self.inner.name.as_str(), value)),
            AccessMode::Programmable => setter::safe_set(self, value),
        }
    }

    /// Checkbox state.
    #[must_use]
    pub fn checked(&self) -> bool {
        self.inner
            .snapshot
            .as_ref()
            .map_or_else(|| self.node().is_some_and(|node| node.checked()), |s| s.checked)
    }

    /// Sets the checkbox state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StaticProxy`] for static proxies.
    pub fn set_checked(&self, checked: bool) -> Result<()> {
        self.ensure_mutable("checked")?;
        self.with_node(|node| node.set_checked(checked));
        Ok(())
    }

    /// Disabled state.
    #[must_use]
    pub fn disabled(&self) -> bool {
        self.inner
            .snapshot
            .as_ref()
            .map_or_else(|| self.node().is_some_and(|node| node.disabled()), |s| s.disabled)
    }

    /// Text content.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.inner
            .snapshot
            .as_ref()
            .map_or_else(
                || self.node().map(|node| node.text_content()).unwrap_or_default(),
                |s| s.text_content.clone(),
            )
    }

    /// Replaces the text content.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StaticProxy`] for static proxies.
    pub fn set_text_content(&self, text: impl Into<String>) -> Result<()> {
        self.ensure_mutable("textContent")?;
        let text = text.into();
        self.with_node(|node| node.set_text_content(text));
        Ok(())
    }

    /// Tab order index.
    #[must_use]
    pub fn tab_index(&self) -> i32 {
        self.inner
            .snapshot
            .as_ref()
            .map_or_else(|| self.node().map_or(-1, |node| node.tab_index()), |s| s.tab_index)
    }

    /// Sets the tab order index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StaticProxy`] for static proxies.
    pub fn set_tab_index(&self, index: i32) -> Result<()> {
        self.ensure_mutable("tabIndex")?;
        self.with_node(|node| node.set_tab_index(index));
        Ok(())
    }

    /// Spellcheck flag.
    #[must_use]
    pub fn spellcheck(&self) -> bool {
        self.inner
            .snapshot
            .as_ref()
            .map_or_else(|| self.node().is_some_and(|node| node.spellcheck()), |s| s.spellcheck)
    }

    /// Sets the spellcheck flag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StaticProxy`] for static proxies.
    pub fn set_spellcheck(&self, on: bool) -> Result<()> {
        self.ensure_mutable("spellcheck")?;
        self.with_node(|node| node.set_spellcheck(on));
        Ok(())
    }

    /// Inline style property.
    #[must_use]
    pub fn style(&self, property: &str) -> Option<String> {
        self.node().and_then(|node| node.style(property))
    }

    /// Sets one inline style property.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StaticProxy`] for static proxies.
    pub fn set_style(&self, property: &str, value: impl Into<String>) -> Result<()> {
        self.ensure_mutable("style")?;
        let value = value.into();
        self.with_node(|node| node.set_style(property, value));
        Ok(())
    }

    /// Applies CSS properties.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StaticProxy`] for static proxies.
    pub fn set_css(&self, css: &StyleMap) -> Result<()> {
        self.ensure_mutable("style")?;
        self.with_node(|node| {
            for (property, value) in css {
                node.set_style(property, value.as_str());
            }
        });
        Ok(())
    }
}

// ============================================================================
// ElementProxy - Behaviour
// ============================================================================

impl ElementProxy {
    /// Clicks the element.
    pub fn click(&self) {
        self.with_node(Node::click);
    }

    /// Focuses the element.
    pub fn focus(&self) {
        self.with_node(Node::focus);
    }

    /// Removes focus from the element.
    pub fn blur(&self) {
        self.with_node(Node::blur);
    }

    /// Scrolls the element into view.
    pub fn scroll_into_view(&self) {
        self.with_node(Node::scroll_into_view);
    }

    /// Schedules `blur`, `change`, `input` and `keydown` events on the
    /// element so page scripts notice a programmatic change.
    ///
    /// Touches inside the debounce window are dropped. Returns `false` for a
    /// dropped touch.
    pub fn touch(&self) -> bool {
        if !self.inner.touch_gate.try_enter() {
            return false;
        }
        setter::schedule_touch(&self.inner.shared, &self.inner.node, &self.inner.name);
        true
    }

    /// Re-resolves this element against the current page.
    ///
    /// Returns the cached proxy if the element is still known, otherwise a
    /// new static proxy named after this proxy's base name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSelector`] if the stored spec no longer
    /// parses.
    pub fn fresh(&self) -> Result<Vec<ElementProxy>> {
        factory::build(
            &self.inner.shared,
            &self.inner.fresh,
            &self.inner.base,
            QueryMode::Fresh,
        )
    }
}
