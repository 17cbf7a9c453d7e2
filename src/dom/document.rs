//! The document: tree root, node factory and document-level listeners.
//!
//! Native events dispatched on a connected node reach every listener that
//! was registered on the document for that event type, provided the event
//! bubbles. This is the only listener surface the model offers; per-element
//! reactions are layered on top of it by the
//! [`DocumentDispatcher`](crate::events::DocumentDispatcher).

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::error::Result;

use super::event::{EventListener, NativeEvent};
use super::node::{Node, NodeKind, WeakNode};

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for a document.
pub(crate) struct DocumentInner {
    /// The `#document` node.
    root: Node,

    /// The `<body>` element.
    body: Node,

    /// Document-level listeners by event type.
    listeners: RwLock<FxHashMap<String, Vec<Arc<dyn EventListener>>>>,

    /// Focused element.
    active: Mutex<WeakNode>,

    /// Element most recently scrolled into view.
    scrolled: Mutex<WeakNode>,
}

// ============================================================================
// Document
// ============================================================================

/// An in-memory page: `#document > html > body`.
///
/// Cloning returns another handle to the same document.
#[derive(Clone)]
pub struct Document {
    inner: Arc<DocumentInner>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.inner.root.descendants().len())
            .finish_non_exhaustive()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Document - Constructor
// ============================================================================

impl Document {
    /// Creates an empty document with `html` and `body` elements.
    #[must_use]
    pub fn new() -> Self {
        let inner = Arc::new_cyclic(|weak| {
            let root = Node::new(NodeKind::Document, weak.clone());
            let html = Node::new(NodeKind::Element("html".into()), weak.clone());
            let body = Node::new(NodeKind::Element("body".into()), weak.clone());
            root.push_child(&html);
            html.push_child(&body);
            DocumentInner {
                root,
                body,
                listeners: RwLock::new(FxHashMap::default()),
                active: Mutex::new(WeakNode::default()),
                scrolled: Mutex::new(WeakNode::default()),
            }
        });
        Self { inner }
    }

    pub(crate) fn from_inner(inner: Arc<DocumentInner>) -> Self {
        Self { inner }
    }
}

// ============================================================================
// Document - Tree Access
// ============================================================================

impl Document {
    /// Returns the `#document` node, the target for global reactions.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.inner.root
    }

    /// Returns the `<body>` element.
    #[inline]
    #[must_use]
    pub fn body(&self) -> &Node {
        &self.inner.body
    }

    /// Creates a detached element owned by this document.
    #[must_use]
    pub fn create_element(&self, tag: &str) -> Node {
        Node::new(
            NodeKind::Element(tag.to_ascii_lowercase().into_boxed_str()),
            Arc::downgrade(&self.inner),
        )
    }

    /// Creates a detached text node owned by this document.
    #[must_use]
    pub fn create_text(&self, text: &str) -> Node {
        let node = Node::new(NodeKind::Text, Arc::downgrade(&self.inner));
        node.set_text_content(text);
        node
    }

    /// Returns all matching elements in document order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSelector`](crate::Error::InvalidSelector) if
    /// `selector` does not parse.
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<Node>> {
        self.inner.root.query_selector_all(selector)
    }

    /// Returns the focused element.
    #[must_use]
    pub fn active_element(&self) -> Option<Node> {
        self.inner.active.lock().upgrade()
    }

    pub(crate) fn set_active_element(&self, node: Option<&Node>) {
        *self.inner.active.lock() = node.map(Node::downgrade).unwrap_or_default();
    }

    /// Returns the element most recently scrolled into view.
    #[must_use]
    pub fn scrolled_into_view(&self) -> Option<Node> {
        self.inner.scrolled.lock().upgrade()
    }

    pub(crate) fn set_scrolled_into_view(&self, node: &Node) {
        *self.inner.scrolled.lock() = node.downgrade();
    }
}

// ============================================================================
// Document - Events
// ============================================================================

impl Document {
    /// Registers a document-level listener for `event_type`.
    pub fn add_event_listener(&self, event_type: &str, listener: Arc<dyn EventListener>) {
        self.inner
            .listeners
            .write()
            .entry(event_type.to_string())
            .or_default()
            .push(listener);
    }

    /// Returns the number of listeners registered for `event_type`.
    #[must_use]
    pub fn listener_count(&self, event_type: &str) -> usize {
        self.inner
            .listeners
            .read()
            .get(event_type)
            .map_or(0, Vec::len)
    }

    /// Dispatches `event` on `target`.
    ///
    /// Listeners run synchronously, in registration order, without any lock
    /// held. Events on detached nodes or events that do not bubble never
    /// reach the document.
    pub fn dispatch_event(&self, target: &Node, mut event: NativeEvent) -> NativeEvent {
        event.set_target(target);
        let reaches_document = target.is_document() || (event.bubbles() && target.is_connected());
        if !reaches_document {
            trace!(event = event.event_type(), target = %target.describe(), "Event stays on target");
            return event;
        }

        let listeners = self
            .inner
            .listeners
            .read()
            .get(event.event_type())
            .cloned()
            .unwrap_or_default();

        for listener in listeners {
            listener.handle_event(&mut event);
        }
        event
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_listener(count: &Arc<AtomicUsize>) -> Arc<dyn EventListener> {
        let count = Arc::clone(count);
        Arc::new(move |_: &mut NativeEvent| {
            count.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_document_skeleton() {
        let doc = Document::new();
        assert_eq!(doc.body().tag_name(), Some("body"));
        assert!(doc.body().is_connected());
        assert_eq!(doc.query_selector_all("html > body").unwrap().len(), 1);
    }

    #[test]
    fn test_bubbling_event_reaches_listener() {
        let doc = Document::new();
        let count = Arc::new(AtomicUsize::new(0));
        doc.add_event_listener("click", counting_listener(&count));

        let button = doc.create_element("button");
        doc.body().append_child(&button).unwrap();
        button.click();
        button.click();

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_detached_target_does_not_reach_document() {
        let doc = Document::new();
        let count = Arc::new(AtomicUsize::new(0));
        doc.add_event_listener("click", counting_listener(&count));

        doc.create_element("button").click();

        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_focus_and_blur() {
        let doc = Document::new();
        let focusins = Arc::new(AtomicUsize::new(0));
        let blurs = Arc::new(AtomicUsize::new(0));
        doc.add_event_listener("focusin", counting_listener(&focusins));
        doc.add_event_listener("blur", counting_listener(&blurs));

        let input = doc.create_element("input");
        doc.body().append_child(&input).unwrap();
        input.focus();
        assert_eq!(doc.active_element(), Some(input.clone()));
        assert_eq!(focusins.load(Ordering::SeqCst), 1);

        input.blur();
        assert!(doc.active_element().is_none());
        // blur does not bubble
        assert_eq!(blurs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_disabled_click_ignored() {
        let doc = Document::new();
        let count = Arc::new(AtomicUsize::new(0));
        doc.add_event_listener("click", counting_listener(&count));

        let button = doc.create_element("button");
        button.set_disabled(true);
        doc.body().append_child(&button).unwrap();
        button.click();

        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
