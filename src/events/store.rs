//! Per-element reaction registry.
//!
//! Entries are keyed by node identity and hold the node weakly. Reactions
//! reach their element only through proxies, which hold it weakly too, so a
//! removed element that nothing else references drops out of the store on
//! the next write. A callback that captures a [`Node`] keeps its entry
//! until [`ReactionStore::clear`].

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::dom::{Node, NodeKey, WeakNode};
use crate::error::{Error, Result};

use super::descriptor::Descriptor;
use super::reaction::Reaction;

// ============================================================================
// Types
// ============================================================================

/// Reactions of one target.
struct Entry {
    node: WeakNode,
    reactions: FxHashMap<Descriptor, Vec<Reaction>>,
}

// ============================================================================
// ReactionStore
// ============================================================================

/// Element to descriptor to reactions.
#[derive(Default)]
pub struct ReactionStore {
    entries: RwLock<FxHashMap<NodeKey, Entry>>,
}

impl fmt::Debug for ReactionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactionStore")
            .field("targets", &self.len())
            .finish()
    }
}

impl ReactionStore {
    /// Creates an empty store.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `reactions` under `descriptor` for `target`.
    ///
    /// Returns the number of reactions now stored under that pair.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAnElement`] unless `target` is an element or the
    /// document node.
    pub fn set(
        &self,
        target: &Node,
        descriptor: Descriptor,
        reactions: impl IntoIterator<Item = Reaction>,
    ) -> Result<usize> {
        if !target.is_element() && !target.is_document() {
            return Err(Error::not_an_element(target.describe()));
        }

        let mut entries = self.entries.write();
        entries.retain(|_, entry| !entry.node.is_expired());

        let entry = entries.entry(target.key()).or_insert_with(|| Entry {
            node: target.downgrade(),
            reactions: FxHashMap::default(),
        });
        let list = entry.reactions.entry(descriptor).or_default();
        list.extend(reactions);
        trace!(target = %target.describe(), count = list.len(), "Reactions stored");
        Ok(list.len())
    }

    /// Returns the reactions of `target` for each descriptor, concatenated
    /// in descriptor order.
    #[must_use]
    pub fn get(&self, target: &Node, descriptors: &[Descriptor]) -> Vec<Reaction> {
        let entries = self.entries.read();
        let Some(entry) = entries.get(&target.key()) else {
            return Vec::new();
        };
        descriptors
            .iter()
            .filter_map(|d| entry.reactions.get(d))
            .flatten()
            .cloned()
            .collect()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        let mut entries = self.entries.write();
        debug!(targets = entries.len(), "Reaction store cleared");
        entries.clear();
    }

    /// Returns the number of targets with reactions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if no target has reactions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::dom::Document;
    use crate::events::EventKind;

    fn tagged(log: &Arc<parking_lot::Mutex<Vec<&'static str>>>, tag: &'static str) -> Reaction {
        let log = Arc::clone(log);
        Arc::new(move || {
            log.lock().push(tag);
            Ok(())
        })
    }

    #[test]
    fn test_set_appends_and_counts() {
        let doc = Document::new();
        let input = doc.create_element("input");
        let store = ReactionStore::new();
        let click = Descriptor::coarse(EventKind::Click);
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let reaction: Reaction = Arc::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        assert_eq!(store.set(&input, click.clone(), [reaction.clone()]).unwrap(), 1);
        assert_eq!(store.set(&input, click.clone(), [reaction]).unwrap(), 2);
        assert_eq!(store.get(&input, &[click]).len(), 2);
    }

    #[test]
    fn test_get_concatenates_in_descriptor_order() {
        let doc = Document::new();
        let input = doc.create_element("input");
        let store = ReactionStore::new();
        let log = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let coarse = Descriptor::coarse(EventKind::Keydown);
        let specific: Descriptor = "onKeydown_CtrlA".parse().unwrap();

        store.set(&input, specific.clone(), [tagged(&log, "specific")]).unwrap();
        store.set(&input, coarse.clone(), [tagged(&log, "coarse")]).unwrap();

        for reaction in store.get(&input, &[coarse, specific]) {
            reaction().unwrap();
        }
        assert_eq!(*log.lock(), ["coarse", "specific"]);
    }

    #[test]
    fn test_text_node_rejected() {
        let doc = Document::new();
        let text = doc.create_text("hello");
        let store = ReactionStore::new();
        let err = store
            .set(&text, Descriptor::coarse(EventKind::Click), Vec::new())
            .unwrap_err();
        assert!(matches!(err, Error::NotAnElement { .. }));
    }

    #[test]
    fn test_document_node_accepted() {
        let doc = Document::new();
        let store = ReactionStore::new();
        store
            .set(doc.root(), Descriptor::coarse(EventKind::Click), Vec::new())
            .unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_dropped_nodes_are_pruned() {
        let doc = Document::new();
        let store = ReactionStore::new();
        let click = Descriptor::coarse(EventKind::Click);
        let log = Arc::new(parking_lot::Mutex::new(Vec::new()));
        {
            let gone = doc.create_element("button");
            store.set(&gone, click.clone(), [tagged(&log, "gone")]).unwrap();
        }
        let kept = doc.create_element("button");
        store.set(&kept, click.clone(), [tagged(&log, "kept")]).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&kept, &[click]).len(), 1);
    }

    #[test]
    fn test_clear() {
        let doc = Document::new();
        let store = ReactionStore::new();
        store
            .set(doc.body(), Descriptor::coarse(EventKind::Input), Vec::new())
            .unwrap();
        store.clear();
        assert!(store.is_empty());
    }
}
