//! Element to proxy cache.

// ============================================================================
// Imports
// ============================================================================

use rustc_hash::FxHashMap;

use crate::dom::{Node, NodeKey};

use super::element::ElementProxy;

// ============================================================================
// ProxyCache
// ============================================================================

/// Maps live elements to their proxies.
///
/// Entries own their proxy, and a proxy only holds its element weakly, so a
/// cached proxy outlives every caller handle but not its element. An entry
/// is dropped on the first insert after its element is gone.
///
/// The proxy's weak node pins the element's address, so a key is never
/// reused by a different element while its entry exists.
#[derive(Default)]
pub(crate) struct ProxyCache {
    entries: FxHashMap<NodeKey, ElementProxy>,
}

impl ProxyCache {
    /// Returns the proxy of `node`.
    pub(crate) fn get(&self, node: &Node) -> Option<ElementProxy> {
        self.entries.get(&node.key()).cloned()
    }

    /// Caches `proxy` for its element.
    pub(crate) fn insert(&mut self, proxy: &ElementProxy) {
        self.prune();
        self.entries.insert(proxy.weak_node().key(), proxy.clone());
    }

    /// Returns the number of entries whose element is alive.
    pub(crate) fn len(&self) -> usize {
        self.entries
            .values()
            .filter(|proxy| !proxy.weak_node().is_expired())
            .count()
    }

    fn prune(&mut self) {
        self.entries
            .retain(|_, proxy| !proxy.weak_node().is_expired());
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::dom::Document;
    use crate::proxy::Query;
    use crate::reactor::Reactor;

    #[test]
    fn test_entry_survives_dropped_handles() {
        let doc = Document::new();
        doc.body()
            .append_child(&doc.create_element("textarea"))
            .unwrap();
        let reactor = Reactor::new(doc, Config::default()).unwrap();

        drop(reactor.query(Query::select("textarea")).unwrap());
        assert_eq!(reactor.cached_proxies(), 1);
    }

    #[test]
    fn test_dropped_elements_are_pruned_on_insert() {
        let doc = Document::new();
        for tag in ["textarea", "input"] {
            doc.body().append_child(&doc.create_element(tag)).unwrap();
        }
        let reactor = Reactor::new(doc.clone(), Config::default()).unwrap();

        let first = reactor.query(Query::select("textarea")).unwrap();
        first[0].node().unwrap().remove();
        assert!(first[0].node().is_none());
        assert_eq!(reactor.cached_proxies(), 0);

        reactor.query(Query::select("input")).unwrap();
        assert_eq!(reactor.cached_proxies(), 1);
    }
}
