//! Reaction declarations and the processor that turns them into runnable
//! reactions.
//!
//! A flow declares reactions as a map from reaction key to callbacks:
//!
//! ```ignore
//! let reactions = Reactions::new()
//!     .on("onInteract", |ctx| { /* ... */ Ok(()) })
//!     .on("onKeydown_CtrlEnter", |ctx| { /* ... */ Ok(()) });
//! ```
//!
//! Processing binds every callback to its [`ReactionContext`], wraps it in
//! a leading-edge debounce, spreads `onInteract` over click, input,
//! keydown and paste, and submits `onLoad` reactions to the scheduler
//! instead of registering them.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::trace;

use crate::error::{Error, Result};
use crate::proxy::ElementProxy;

use super::descriptor::{Descriptor, EventKind};
use super::scheduler::Scheduler;

// ============================================================================
// Types
// ============================================================================

/// A user callback, called with the context it was registered for.
pub type Callback = Arc<dyn Fn(&ReactionContext) -> Result<()> + Send + Sync>;

/// A callback bound to its context and debounced, ready to run.
pub type Reaction = Arc<dyn Fn() -> Result<()> + Send + Sync>;

// ============================================================================
// ReactionContext
// ============================================================================

/// What a callback sees when it runs.
///
/// Element reactions get their own proxy, its index in the query result and
/// the whole result group. Global reactions get no proxy and an empty group.
#[derive(Clone, Default)]
pub struct ReactionContext {
    proxy: Option<ElementProxy>,
    idx: usize,
    group: Arc<[ElementProxy]>,
}

impl ReactionContext {
    /// Creates the context for element `idx` of `group`.
    #[must_use]
    pub fn element(group: Arc<[ElementProxy]>, idx: usize) -> Self {
        Self {
            proxy: group.get(idx).cloned(),
            idx,
            group,
        }
    }

    /// Creates the context for global reactions.
    #[inline]
    #[must_use]
    pub fn global() -> Self {
        Self::default()
    }

    /// Returns the proxy the reaction is attached to.
    #[inline]
    #[must_use]
    pub fn proxy(&self) -> Option<&ElementProxy> {
        self.proxy.as_ref()
    }

    /// Returns the proxy's index in its query result.
    #[inline]
    #[must_use]
    pub fn idx(&self) -> usize {
        self.idx
    }

    /// Returns every proxy of the query result.
    #[inline]
    #[must_use]
    pub fn group(&self) -> &[ElementProxy] {
        &self.group
    }
}

impl fmt::Debug for ReactionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactionContext")
            .field("proxy", &self.proxy.as_ref().map(ElementProxy::name))
            .field("idx", &self.idx)
            .field("group", &self.group.len())
            .finish()
    }
}

// ============================================================================
// Reactions
// ============================================================================

/// Declared reactions: reaction keys and their callbacks, in declaration
/// order.
#[derive(Clone, Default)]
pub struct Reactions {
    entries: Vec<(String, Vec<Callback>)>,
}

impl Reactions {
    /// Creates an empty declaration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a callback under `key`.
    #[must_use]
    pub fn on<F>(self, key: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&ReactionContext) -> Result<()> + Send + Sync + 'static,
    {
        self.on_all(key, vec![Arc::new(callback) as Callback])
    }

    /// Adds several callbacks under `key`.
    ///
    /// An empty list is kept and rejected when the declaration is processed.
    #[must_use]
    pub fn on_all(mut self, key: impl Into<String>, callbacks: Vec<Callback>) -> Self {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, list)) => list.extend(callbacks),
            None => self.entries.push((key, callbacks)),
        }
        self
    }

    /// Returns `true` if nothing was declared.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the declared keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Parses and checks every reaction key.
    ///
    /// Keys that do not start with `on` are skipped. Keys naming the same
    /// descriptor are merged in declaration order.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedEvent`] for an `on*` key outside the allow-list
    /// - [`Error::InvalidDescriptor`] for a malformed modifier suffix
    /// - [`Error::EmptyReaction`] for a key without callbacks
    pub fn validate(&self, name: &str) -> Result<Declared> {
        let mut declared = Declared::default();
        for (key, callbacks) in &self.entries {
            if !Descriptor::is_reaction_key(key) {
                trace!(key = %key, "Skipping non-reaction key");
                continue;
            }
            let descriptor: Descriptor = key.parse()?;
            if callbacks.is_empty() {
                return Err(Error::empty_reaction(name, key.as_str()));
            }
            declared.push(descriptor, callbacks.iter().cloned());
        }
        Ok(declared)
    }
}

impl fmt::Debug for Reactions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k, v.len())))
            .finish()
    }
}

// ============================================================================
// Grouped
// ============================================================================

/// Items grouped by descriptor, in first-seen order.
#[derive(Clone)]
pub struct Grouped<T> {
    groups: Vec<(Descriptor, Vec<T>)>,
}

/// Validated declarations.
pub type Declared = Grouped<Callback>;

/// Processed reactions, ready to store.
pub type Processed = Grouped<Reaction>;

impl<T> Default for Grouped<T> {
    fn default() -> Self {
        Self { groups: Vec::new() }
    }
}

/// Descriptor keys with item counts; callbacks have no useful `Debug`.
impl<T> fmt::Debug for Grouped<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.groups.iter().map(|(d, items)| (d.to_string(), items.len())))
            .finish()
    }
}

impl<T> Grouped<T> {
    fn push(&mut self, descriptor: Descriptor, items: impl IntoIterator<Item = T>) {
        match self.groups.iter_mut().find(|(d, _)| *d == descriptor) {
            Some((_, list)) => list.extend(items),
            None => self.groups.push((descriptor, items.into_iter().collect())),
        }
    }

    fn take(&mut self, descriptor: &Descriptor) -> Vec<T> {
        match self.groups.iter().position(|(d, _)| d == descriptor) {
            Some(pos) => self.groups.remove(pos).1,
            None => Vec::new(),
        }
    }

    /// Returns the items stored under `descriptor`.
    #[must_use]
    pub fn get(&self, descriptor: &Descriptor) -> Option<&[T]> {
        self.groups
            .iter()
            .find(|(d, _)| d == descriptor)
            .map(|(_, v)| v.as_slice())
    }

    /// Returns the descriptors in first-seen order.
    pub fn descriptors(&self) -> impl Iterator<Item = &Descriptor> {
        self.groups.iter().map(|(d, _)| d)
    }

    /// Returns `true` if nothing is grouped.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl<T> IntoIterator for Grouped<T> {
    type Item = (Descriptor, Vec<T>);
    type IntoIter = std::vec::IntoIter<(Descriptor, Vec<T>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

// ============================================================================
// Debounce
// ============================================================================

/// Leading-edge debounce gate.
///
/// The first call opens a window; calls inside the window are dropped.
#[derive(Debug)]
pub struct Debounce {
    window: Duration,
    opened: Mutex<Option<Instant>>,
}

impl Debounce {
    /// Creates a gate with the given window.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            opened: Mutex::new(None),
        }
    }

    /// Returns `true` if a call may go through now.
    pub fn try_enter(&self) -> bool {
        let now = Instant::now();
        let mut opened = self.opened.lock();
        if opened.is_some_and(|t| now.duration_since(t) < self.window) {
            return false;
        }
        *opened = Some(now);
        true
    }
}

/// Binds `callback` to `context` behind its own debounce gate.
#[must_use]
pub fn bind(callback: Callback, context: ReactionContext, window: Duration) -> Reaction {
    let gate = Debounce::new(window);
    Arc::new(move || {
        if !gate.try_enter() {
            trace!("Debounced reaction dropped");
            return Ok(());
        }
        callback(&context)
    })
}

// ============================================================================
// ReactionProcessor
// ============================================================================

/// Turns validated declarations into reactions for one context.
pub struct ReactionProcessor<'a> {
    window: Duration,
    scheduler: &'a Scheduler,
}

impl<'a> ReactionProcessor<'a> {
    /// Creates a processor with the given debounce window.
    #[must_use]
    pub fn new(window: Duration, scheduler: &'a Scheduler) -> Self {
        Self { window, scheduler }
    }

    /// Processes `declared` for `context`.
    ///
    /// Wrapping happens before `onInteract` is spread, so the spread copies
    /// share one debounce gate. `onLoad` reactions are submitted to the
    /// scheduler and left out of the result.
    pub fn process(&self, declared: &Declared, context: &ReactionContext) -> Processed {
        let mut processed = Processed::default();
        for (descriptor, callbacks) in &declared.groups {
            processed.push(
                descriptor.clone(),
                callbacks
                    .iter()
                    .map(|cb| bind(Arc::clone(cb), context.clone(), self.window)),
            );
        }

        let interact = processed.take(&Descriptor::coarse(EventKind::Interact));
        if !interact.is_empty() {
            for kind in EventKind::INTERACT_TARGETS {
                processed.push(Descriptor::coarse(kind), interact.iter().cloned());
            }
        }

        for reaction in processed.take(&Descriptor::coarse(EventKind::Load)) {
            self.scheduler
                .submit_fn(EventKind::Load.reaction_key(), move || reaction());
        }

        processed
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::logging::Logbook;

    fn counter(
        count: &Arc<AtomicUsize>,
    ) -> impl Fn(&ReactionContext) -> Result<()> + Send + Sync + 'static {
        let count = Arc::clone(count);
        move |_: &ReactionContext| {
            count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn scheduler() -> Arc<Scheduler> {
        Scheduler::new(Arc::new(Logbook::default()))
    }

    #[test]
    fn test_validate_skips_non_reaction_keys() {
        let count = Arc::new(AtomicUsize::new(0));
        let declared = Reactions::new()
            .on("selector", counter(&count))
            .on("onClick", counter(&count))
            .validate("Button")
            .unwrap();
        assert_eq!(declared.descriptors().count(), 1);
    }

    #[test]
    fn test_validate_empty_list() {
        let err = Reactions::new()
            .on_all("onClick", Vec::new())
            .validate("Button")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to add 'onClick' reaction to Button. No reaction functions given."
        );
    }

    #[test]
    fn test_declared_debug_lists_counts() {
        let count = Arc::new(AtomicUsize::new(0));
        let declared = Reactions::new()
            .on("onClick", counter(&count))
            .on("onClick", counter(&count))
            .validate("Button")
            .unwrap();
        assert_eq!(format!("{declared:?}"), r#"{"onClick": 2}"#);
    }

    #[test]
    fn test_validate_merges_equivalent_keys() {
        let count = Arc::new(AtomicUsize::new(0));
        let declared = Reactions::new()
            .on("onKeydown_ShiftCtrlA", counter(&count))
            .on("onKeydown_CtrlShiftA", counter(&count))
            .validate("Input")
            .unwrap();
        let d: Descriptor = "onKeydown_CtrlShiftA".parse().unwrap();
        assert_eq!(declared.get(&d).unwrap().len(), 2);
    }

    #[test]
    fn test_debounce_drops_calls_inside_window() {
        let gate = Debounce::new(Duration::from_secs(60));
        assert!(gate.try_enter());
        assert!(!gate.try_enter());

        let open = Debounce::new(Duration::ZERO);
        assert!(open.try_enter());
        assert!(open.try_enter());
    }

    #[test]
    fn test_interact_spreads_with_shared_gate() {
        let scheduler = scheduler();
        let count = Arc::new(AtomicUsize::new(0));
        let declared = Reactions::new()
            .on("onInteract", counter(&count))
            .validate("Field")
            .unwrap();

        let processor = ReactionProcessor::new(Duration::from_secs(60), &scheduler);
        let processed = processor.process(&declared, &ReactionContext::global());

        let kinds: Vec<_> = processed.descriptors().map(Descriptor::to_string).collect();
        assert_eq!(kinds, ["onClick", "onInput", "onKeydown", "onPaste"]);

        let click = processed.get(&Descriptor::coarse(EventKind::Click)).unwrap()[0].clone();
        let input = processed.get(&Descriptor::coarse(EventKind::Input)).unwrap()[0].clone();
        click().unwrap();
        input().unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_interact_appends_after_declared() {
        let scheduler = scheduler();
        let order = Arc::new(Mutex::new(Vec::new()));
        let (a, b) = (Arc::clone(&order), Arc::clone(&order));
        let declared = Reactions::new()
            .on("onInteract", move |_: &ReactionContext| {
                a.lock().push("interact");
                Ok(())
            })
            .on("onClick", move |_: &ReactionContext| {
                b.lock().push("click");
                Ok(())
            })
            .validate("Field")
            .unwrap();

        let processed = ReactionProcessor::new(Duration::ZERO, &scheduler)
            .process(&declared, &ReactionContext::global());
        for reaction in processed.get(&Descriptor::coarse(EventKind::Click)).unwrap() {
            reaction().unwrap();
        }
        assert_eq!(*order.lock(), ["click", "interact"]);
    }

    #[tokio::test]
    async fn test_load_is_scheduled_not_stored() {
        let scheduler = scheduler();
        let count = Arc::new(AtomicUsize::new(0));
        let declared = Reactions::new()
            .on("onLoad", counter(&count))
            .validate("Page")
            .unwrap();

        let processed = ReactionProcessor::new(Duration::ZERO, &scheduler)
            .process(&declared, &ReactionContext::global());
        assert!(processed.is_empty());
        assert_eq!(count.load(Ordering::SeqCst), 0);

        scheduler.run_pending().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
