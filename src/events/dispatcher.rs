//! Document-level event dispatcher.
//!
//! One listener per native event kind is registered on the document. For
//! each event it cancels the default action of reserved shortcuts, looks up
//! the reactions of the event target followed by the global reactions, and
//! submits them to the scheduler.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::{Arc, Weak};

use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use crate::dom::{Document, EventListener, NativeEvent, WeakNode};

use super::descriptor::{EventKind, event_chord, event_descriptors};
use super::key::KeyChord;
use super::reaction::Reaction;
use super::scheduler::Scheduler;
use super::store::ReactionStore;

// ============================================================================
// Constants
// ============================================================================

/// Chords whose browser default is cancelled unless configured otherwise.
pub const DEFAULT_PREVENTED: &[&str] = &[
    "Backquote",
    "Backslash",
    "NumpadAdd",
    "NumpadSubtract",
    "NumpadMultiply",
    "CtrlEnter",
    "CtrlAltEnter",
    "CtrlNumpadEnter",
    "AltArrowLeft",
    "AltArrowRight",
    "CtrlAltEqual",
];

// ============================================================================
// DocumentDispatcher
// ============================================================================

/// Routes native events to stored reactions.
///
/// Holds the store weakly: the store owns reactions, reactions own proxies,
/// proxies own the document, and the document owns this listener.
pub struct DocumentDispatcher {
    store: Weak<ReactionStore>,
    scheduler: Arc<Scheduler>,
    prevent_default: FxHashSet<KeyChord>,
    root: WeakNode,
}

impl fmt::Debug for DocumentDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentDispatcher")
            .field("prevent_default", &self.prevent_default.len())
            .finish_non_exhaustive()
    }
}

impl DocumentDispatcher {
    /// Creates a dispatcher and registers it on `document`.
    pub fn install(
        document: &Document,
        store: &Arc<ReactionStore>,
        scheduler: Arc<Scheduler>,
        prevent_default: FxHashSet<KeyChord>,
    ) -> Arc<Self> {
        let dispatcher = Arc::new(Self {
            store: Arc::downgrade(store),
            scheduler,
            prevent_default,
            root: document.root().downgrade(),
        });
        for kind in EventKind::native() {
            document.add_event_listener(
                kind.event_type(),
                Arc::clone(&dispatcher) as Arc<dyn EventListener>,
            );
        }
        debug!(events = EventKind::native().count(), "Document dispatcher installed");
        dispatcher
    }

    /// Returns `true` if the browser default of `chord` is cancelled.
    #[must_use]
    pub fn prevents_default(&self, chord: &KeyChord) -> bool {
        self.prevent_default.contains(chord)
    }

    /// Returns the element reactions of the target followed by the global
    /// reactions.
    fn matching(&self, event: &NativeEvent) -> Vec<Reaction> {
        let Some(store) = self.store.upgrade() else {
            return Vec::new();
        };
        let Some(descriptors) = event_descriptors(event) else {
            return Vec::new();
        };

        let mut reactions = Vec::new();
        let target = event.target();
        if let Some(target) = target {
            reactions.extend(store.get(target, &descriptors));
        }
        if let Some(root) = self.root.upgrade()
            && target != Some(&root)
        {
            reactions.extend(store.get(&root, &descriptors));
        }
        reactions
    }
}

impl EventListener for DocumentDispatcher {
    fn handle_event(&self, event: &mut NativeEvent) {
        if event.event_type() == EventKind::Keydown.event_type()
            && self.prevents_default(&event_chord(event))
        {
            trace!(chord = %event_chord(event), "Default prevented");
            event.prevent_default();
        }

        let reactions = self.matching(event);
        if reactions.is_empty() {
            return;
        }
        trace!(event = event.event_type(), count = reactions.len(), "Submitting reactions");
        for reaction in reactions {
            self.scheduler
                .submit_fn(event.event_type().to_string(), move || reaction());
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
