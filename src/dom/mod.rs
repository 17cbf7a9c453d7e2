//! In-memory page model.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Document`] | Tree root, node factory, document-level listeners |
//! | [`Node`] | Handle to an element, text node or the document node |
//! | [`NativeEvent`] | Event with modifier flags and key code |
//! | [`Selector`] | Parsed CSS selector list |
//!
//! # Example
//!
//! ```ignore
//! use dom_reactor::dom::Document;
//!
//! let doc = Document::new();
//! let button = doc.create_element("button").with_text("Submit");
//! doc.body().append_child(&button)?;
//!
//! assert_eq!(doc.query_selector_all("body > button")?.len(), 1);
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Document root and listeners.
pub mod document;

/// Native events.
pub mod event;

/// Nodes and form state.
pub mod node;

/// CSS selectors.
pub mod selector;

// ============================================================================
// Re-exports
// ============================================================================

pub use document::Document;
pub use event::{EventListener, NativeEvent};
pub use node::{Node, NodeKey, NodeKind, WeakNode};
pub use selector::Selector;
