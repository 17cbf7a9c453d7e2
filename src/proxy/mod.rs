//! Guarded element proxies.
//!
//! | Module | Contents |
//! |--------|----------|
//! | `mode` | [`AccessMode`], [`QueryMode`] |
//! | `query` | [`SelectorSpec`], [`Query`] |
//! | `element` | [`ElementProxy`] |
//! | `setter` | The safe value setter and touch events |
//! | `factory` | Resolution, naming and caching |
//! | `cache` | Element to proxy cache, keyed by live elements |

// ============================================================================
// Submodules
// ============================================================================

mod cache;
mod element;
mod factory;
mod mode;
mod query;
mod setter;

// ============================================================================
// Re-exports
// ============================================================================

pub use element::ElementProxy;
pub use mode::{AccessMode, QueryMode};
pub use query::{Query, SelectorSpec, StyleMap, UNNAMED, indexed_name};
pub use setter::EDITABLE_ELEMENT_TYPES;

pub(crate) use cache::ProxyCache;
pub(crate) use factory::build;
