//! Document nodes.
//!
//! A [`Node`] is a cheap, clonable handle to one node of a [`Document`]
//! tree. Children are owned by their parent; parent and document links are
//! weak, so a subtree removed from the page is dropped once the last handle
//! goes away.
//!
//! # Example
//!
//! ```ignore
//! let doc = Document::new();
//! let input = doc
//!     .create_element("input")
//!     .with_attribute("type", "text")
//!     .with_value("Summer sale");
//! doc.body().append_child(&input)?;
//!
//! assert_eq!(input.element_type(), "text");
//! assert_eq!(input.value().as_deref(), Some("Summer sale"));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::iter;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::error::{Error, Result};

use super::document::{Document, DocumentInner};
use super::event::NativeEvent;
use super::selector::Selector;

// ============================================================================
// Constants
// ============================================================================

/// Tags whose `tabIndex` defaults to 0 instead of -1.
const FOCUSABLE_TAGS: &[&str] = &["a", "button", "input", "select", "textarea"];

/// Input `type` attribute values recognised by the model.
///
/// Anything else falls back to `text`, as browsers do.
const INPUT_TYPES: &[&str] = &[
    "button", "checkbox", "color", "date", "email", "file", "hidden", "number", "password",
    "radio", "range", "reset", "search", "submit", "tel", "text", "url",
];

// ============================================================================
// Types
// ============================================================================

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The document root.
    Document,
    /// An element with a lowercase tag name.
    Element(Box<str>),
    /// A text node.
    Text,
}

/// Internal shared state for a node.
pub(crate) struct NodeInner {
    /// Node kind, fixed at creation.
    kind: NodeKind,

    /// Owning document.
    document: Weak<DocumentInner>,

    /// Mutable tree and form state.
    state: RwLock<NodeState>,
}

#[derive(Default)]
struct NodeState {
    parent: Weak<NodeInner>,
    children: Vec<Node>,
    attributes: Vec<(String, String)>,
    text: String,
    value: String,
    checked: bool,
    spellcheck: bool,
    style: FxHashMap<String, String>,
}

/// Identity of a node, usable as a map key.
///
/// Only meaningful while some handle (strong or [`WeakNode`]) to the node
/// exists, which keeps the address from being reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeKey(usize);

// ============================================================================
// Node
// ============================================================================

/// A handle to a node in a [`Document`].
///
/// Equality and hashing use node identity.
#[derive(Clone)]
pub struct Node {
    pub(crate) inner: Arc<NodeInner>,
}

/// A non-owning handle to a node.
#[derive(Clone, Default)]
pub struct WeakNode(Weak<NodeInner>);

impl WeakNode {
    /// Returns the node if it is still alive.
    #[inline]
    #[must_use]
    pub fn upgrade(&self) -> Option<Node> {
        self.0.upgrade().map(|inner| Node { inner })
    }

    /// Returns the identity key of the referenced node.
    #[inline]
    #[must_use]
    pub fn key(&self) -> NodeKey {
        NodeKey(self.0.as_ptr() as *const () as usize)
    }

    /// Returns `true` if the node has been dropped.
    #[inline]
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.0.strong_count() == 0
    }
}

impl fmt::Debug for WeakNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(node) => write!(f, "WeakNode({})", node.describe()),
            None => f.write_str("WeakNode(<dropped>)"),
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Node {}

impl std::hash::Hash for Node {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

// ============================================================================
// Node - Constructor & Identity
// ============================================================================

impl Node {
    /// Creates a detached node belonging to `document`.
    pub(crate) fn new(kind: NodeKind, document: Weak<DocumentInner>) -> Self {
        Self {
            inner: Arc::new(NodeInner {
                kind,
                document,
                state: RwLock::new(NodeState {
                    spellcheck: true,
                    ..NodeState::default()
                }),
            }),
        }
    }

    /// Returns the node kind.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.inner.kind
    }

    /// Returns the lowercase tag name of an element.
    #[inline]
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        match &self.inner.kind {
            NodeKind::Element(tag) => Some(&**tag),
            _ => None,
        }
    }

    /// Returns `true` for element nodes.
    #[inline]
    #[must_use]
    pub fn is_element(&self) -> bool {
        matches!(self.inner.kind, NodeKind::Element(_))
    }

    /// Returns `true` for the document root.
    #[inline]
    #[must_use]
    pub fn is_document(&self) -> bool {
        self.inner.kind == NodeKind::Document
    }

    /// Returns the identity key of this node.
    #[inline]
    #[must_use]
    pub fn key(&self) -> NodeKey {
        NodeKey(Arc::as_ptr(&self.inner) as *const () as usize)
    }

    /// Creates a non-owning handle.
    #[inline]
    #[must_use]
    pub fn downgrade(&self) -> WeakNode {
        WeakNode(Arc::downgrade(&self.inner))
    }

    /// Returns the owning document, if it is still alive.
    #[must_use]
    pub fn document(&self) -> Option<Document> {
        self.inner.document.upgrade().map(Document::from_inner)
    }

    /// Short CSS-like description, e.g. `<input#q.wide>`.
    #[must_use]
    pub fn describe(&self) -> String {
        match &self.inner.kind {
            NodeKind::Document => "#document".to_string(),
            NodeKind::Text => "#text".to_string(),
            NodeKind::Element(tag) => {
                let mut out = format!("<{tag}");
                if let Some(id) = self.attribute("id") {
                    out.push('#');
                    out.push_str(&id);
                }
                for class in self.classes() {
                    out.push('.');
                    out.push_str(&class);
                }
                out.push('>');
                out
            }
        }
    }
}

// ============================================================================
// Node - Tree
// ============================================================================

impl Node {
    /// Returns the parent node.
    #[must_use]
    pub fn parent(&self) -> Option<Node> {
        self.inner
            .state
            .read()
            .parent
            .upgrade()
            .map(|inner| Node { inner })
    }

    /// Returns the child nodes in order.
    #[must_use]
    pub fn children(&self) -> Vec<Node> {
        self.inner.state.read().children.clone()
    }

    /// Iterates over the ancestors, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = Node> {
        iter::successors(self.parent(), Node::parent)
    }

    /// Returns all descendants in document (pre-)order, excluding `self`.
    #[must_use]
    pub fn descendants(&self) -> Vec<Node> {
        let mut out = Vec::new();
        let mut stack: Vec<Node> = self.children().into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            stack.extend(node.children().into_iter().rev());
            out.push(node);
        }
        out
    }

    /// Returns `true` if the node is attached to its document's tree.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.is_document() || self.ancestors().any(|a| a.is_document())
    }

    /// Appends `child`, detaching it from its previous parent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Hierarchy`] if `self` is a text node, `child` is a
    /// document, or `child` is `self` or one of its ancestors.
    pub fn append_child(&self, child: &Node) -> Result<()> {
        if self.inner.kind == NodeKind::Text {
            return Err(Error::hierarchy("text nodes cannot have children"));
        }
        if child.is_document() {
            return Err(Error::hierarchy("a document cannot be a child"));
        }
        if child == self || self.ancestors().any(|a| &a == child) {
            return Err(Error::hierarchy(format!(
                "{} cannot contain its ancestor {}",
                self.describe(),
                child.describe()
            )));
        }
        child.remove();
        self.push_child(child);
        Ok(())
    }

    /// Appends without hierarchy checks; used while building a fresh tree.
    pub(crate) fn push_child(&self, child: &Node) {
        child.inner.state.write().parent = Arc::downgrade(&self.inner);
        self.inner.state.write().children.push(child.clone());
    }

    /// Detaches the node from its parent.
    pub fn remove(&self) {
        let Some(parent) = self.parent() else {
            return;
        };
        parent.inner.state.write().children.retain(|c| c != self);
        self.inner.state.write().parent = Weak::new();
    }

    /// Returns all matching descendant elements in document order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSelector`] if `selector` does not parse.
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<Node>> {
        let selector = Selector::parse(selector)?;
        Ok(self.select_all(&selector))
    }

    /// Returns all descendant elements matching an already parsed selector.
    #[must_use]
    pub fn select_all(&self, selector: &Selector) -> Vec<Node> {
        self.descendants()
            .into_iter()
            .filter(|n| selector.matches(n))
            .collect()
    }
}

// ============================================================================
// Node - Attributes & Content
// ============================================================================

impl Node {
    /// Gets an attribute value.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.inner
            .state
            .read()
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    /// Returns `true` if the attribute is present.
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.inner
            .state
            .read()
            .attributes
            .iter()
            .any(|(n, _)| n == name)
    }

    /// Sets an attribute value.
    pub fn set_attribute(&self, name: &str, value: impl Into<String>) {
        let value = value.into();
        let mut state = self.inner.state.write();
        match state.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value,
            None => state.attributes.push((name.to_string(), value)),
        }
    }

    /// Removes an attribute.
    pub fn remove_attribute(&self, name: &str) {
        self.inner
            .state
            .write()
            .attributes
            .retain(|(n, _)| n != name);
    }

    /// Returns the entries of the `class` attribute.
    #[must_use]
    pub fn classes(&self) -> Vec<String> {
        self.attribute("class")
            .map(|c| c.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Returns the concatenated text of all descendant text nodes.
    #[must_use]
    pub fn text_content(&self) -> String {
        if self.inner.kind == NodeKind::Text {
            return self.inner.state.read().text.clone();
        }
        self.descendants()
            .iter()
            .filter(|n| n.inner.kind == NodeKind::Text)
            .map(|n| n.inner.state.read().text.clone())
            .collect()
    }

    /// Replaces the children with a single text node.
    pub fn set_text_content(&self, text: impl Into<String>) {
        let text = text.into();
        if self.inner.kind == NodeKind::Text {
            self.inner.state.write().text = text;
            return;
        }
        for child in self.children() {
            child.remove();
        }
        if !text.is_empty() {
            let node = Node::new(NodeKind::Text, self.inner.document.clone());
            node.inner.state.write().text = text;
            self.push_child(&node);
        }
    }

    /// Gets an inline style property.
    #[must_use]
    pub fn style(&self, property: &str) -> Option<String> {
        self.inner.state.read().style.get(property).cloned()
    }

    /// Sets an inline style property.
    pub fn set_style(&self, property: &str, value: impl Into<String>) {
        self.inner
            .state
            .write()
            .style
            .insert(property.to_string(), value.into());
    }
}

// ============================================================================
// Node - Form State
// ============================================================================

impl Node {
    /// Returns the form control type, mirroring `HTMLElement.type`.
    ///
    /// Empty for elements that have no `type` property.
    #[must_use]
    pub fn element_type(&self) -> String {
        match self.tag_name() {
            Some("input") => {
                let declared = self
                    .attribute("type")
                    .map(|t| t.to_ascii_lowercase())
                    .unwrap_or_default();
                if INPUT_TYPES.contains(&declared.as_str()) {
                    declared
                } else {
                    "text".to_string()
                }
            }
            Some("textarea") => "textarea".to_string(),
            Some("select") if self.has_attribute("multiple") => "select-multiple".to_string(),
            Some("select") => "select-one".to_string(),
            Some("button") => self
                .attribute("type")
                .unwrap_or_else(|| "submit".to_string()),
            _ => String::new(),
        }
    }

    /// Returns the form value, or `None` for elements without one.
    #[must_use]
    pub fn value(&self) -> Option<String> {
        match self.tag_name()? {
            "input" | "textarea" | "select" => Some(self.inner.state.read().value.clone()),
            "option" => Some(
                self.attribute("value")
                    .unwrap_or_else(|| self.text_content()),
            ),
            "button" => Some(self.attribute("value").unwrap_or_default()),
            _ => None,
        }
    }

    /// Sets the raw form value, without any event.
    ///
    /// Proxies route writes through their safe setter instead.
    pub fn set_value(&self, value: impl Into<String>) {
        match self.tag_name() {
            Some("input" | "textarea" | "select") => {
                self.inner.state.write().value = value.into();
            }
            Some("option" | "button") => self.set_attribute("value", value),
            _ => trace!(node = %self.describe(), "Ignoring value on element without one"),
        }
    }

    /// Returns the checked state.
    #[must_use]
    pub fn checked(&self) -> bool {
        self.inner.state.read().checked
    }

    /// Sets the checked state.
    pub fn set_checked(&self, checked: bool) {
        self.inner.state.write().checked = checked;
    }

    /// Returns `true` if the `disabled` attribute is present.
    #[must_use]
    pub fn disabled(&self) -> bool {
        self.has_attribute("disabled")
    }

    /// Adds or removes the `disabled` attribute.
    pub fn set_disabled(&self, disabled: bool) {
        if disabled {
            self.set_attribute("disabled", "");
        } else {
            self.remove_attribute("disabled");
        }
    }

    /// Returns the tab index.
    #[must_use]
    pub fn tab_index(&self) -> i32 {
        if let Some(index) = self.attribute("tabindex").and_then(|t| t.trim().parse().ok()) {
            return index;
        }
        match self.tag_name() {
            Some(tag) if FOCUSABLE_TAGS.contains(&tag) => 0,
            _ => -1,
        }
    }

    /// Sets the tab index.
    pub fn set_tab_index(&self, index: i32) {
        self.set_attribute("tabindex", index.to_string());
    }

    /// Returns the spellcheck flag.
    #[must_use]
    pub fn spellcheck(&self) -> bool {
        self.inner.state.read().spellcheck
    }

    /// Sets the spellcheck flag.
    pub fn set_spellcheck(&self, on: bool) {
        self.inner.state.write().spellcheck = on;
    }
}

// ============================================================================
// Node - Builders
// ============================================================================

impl Node {
    /// Sets an attribute and returns the node.
    #[must_use]
    pub fn with_attribute(self, name: &str, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Sets the text content and returns the node.
    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.set_text_content(text);
        self
    }

    /// Sets the form value and returns the node.
    #[must_use]
    pub fn with_value(self, value: impl Into<String>) -> Self {
        self.set_value(value);
        self
    }

    /// Appends children and returns the node.
    ///
    /// # Errors
    ///
    /// See [`Node::append_child`].
    pub fn with_children(self, children: impl IntoIterator<Item = Node>) -> Result<Self> {
        for child in children {
            self.append_child(&child)?;
        }
        Ok(self)
    }
}

// ============================================================================
// Node - Behaviour
// ============================================================================

impl Node {
    /// Dispatches `event` with this node as target.
    ///
    /// Returns the event after all listeners ran.
    pub fn dispatch_event(&self, event: NativeEvent) -> NativeEvent {
        match self.inner.document.upgrade() {
            Some(document) => Document::from_inner(document).dispatch_event(self, event),
            None => event,
        }
    }

    /// Clicks the element. Disabled elements ignore clicks.
    pub fn click(&self) {
        if self.disabled() {
            trace!(node = %self.describe(), "Click on disabled element ignored");
            return;
        }
        self.dispatch_event(NativeEvent::new("click"));
    }

    /// Focuses the element.
    pub fn focus(&self) {
        if let Some(document) = self.document() {
            document.set_active_element(Some(self));
        }
        self.dispatch_event(NativeEvent::new("focus"));
        self.dispatch_event(NativeEvent::new("focusin"));
    }

    /// Removes focus from the element if it has it.
    pub fn blur(&self) {
        let Some(document) = self.document() else {
            return;
        };
        if document.active_element().as_ref() != Some(self) {
            return;
        }
        document.set_active_element(None);
        self.dispatch_event(NativeEvent::new("blur"));
        self.dispatch_event(NativeEvent::new("focusout"));
    }

    /// Records this element as scrolled into view.
    pub fn scroll_into_view(&self) {
        if let Some(document) = self.document() {
            document.set_scrolled_into_view(self);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
