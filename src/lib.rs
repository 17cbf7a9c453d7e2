//! DOM Reactor - guarded element proxies and keyboard-driven reactions.
//!
//! This library is the page-side core of a review automation helper. Flows
//! find form elements, wrap them in access-checked proxies and declare how
//! the page should react to clicks, input and keyboard shortcuts.
//!
//! # Architecture
//!
//! Everything hangs off one [`Reactor`] per document:
//!
//! - **Proxies**: queries resolve elements into [`ElementProxy`] handles
//!   whose [`AccessMode`] decides which writes are allowed
//! - **Reactions**: callbacks declared under keys like
//!   `onKeydown_CtrlEnter` are debounced, bound to their proxy and stored
//!   per element
//! - **Dispatch**: one listener per event type on the document looks up
//!   the target's reactions and submits them to a [`Scheduler`]
//!
//! Key design principles:
//!
//! - Value writes go through one safe setter that touches the element and
//!   logs the change
//! - Proxies hold their element weakly and the cache holds proxies, so
//!   repeated queries return the same proxy while the element lives
//! - Reactions never run on the dispatching caller's stack
//!
//! # Quick Start
//!
//! ```ignore
//! use dom_reactor::{Config, Document, Query, Reactor, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let document = Document::new();
//!     let reactor = Reactor::new(document.clone(), Config::default())?;
//!     reactor.scheduler().spawn();
//!
//!     reactor.query(
//!         Query::select("textarea")
//!             .name("Answer")
//!             .reference("answers")
//!             .on("onKeydown_CtrlEnter", |ctx| {
//!                 if let Some(proxy) = ctx.proxy() {
//!                     proxy.set_value(proxy.value().unwrap_or_default().trim())?;
//!                 }
//!                 Ok(())
//!             }),
//!     )?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | [`Config`] and named settings |
//! | [`dom`] | In-memory page model: [`Document`], [`Node`], [`NativeEvent`] |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`events`] | Descriptors, reactions, store, dispatcher, scheduler |
//! | [`logging`] | [`Logger`], [`Logbook`] and GUI updates |
//! | [`proxy`] | [`ElementProxy`], [`Query`], [`SelectorSpec`] |
//! | [`util`] | Retry, text, URL, counter and group helpers |

// ============================================================================
// Modules
// ============================================================================

/// Reactor configuration and named settings.
pub mod config;

/// In-memory page model.
///
/// Documents, nodes, selectors and native events the reactor works on.
pub mod dom;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Event descriptors and reactions.
pub mod events;

/// Leveled log entries and GUI updates.
pub mod logging;

/// Guarded element proxies.
pub mod proxy;

/// The per-document reactor.
pub mod reactor;

/// Helpers shared by flows.
pub mod util;

// ============================================================================
// Re-exports
// ============================================================================

// Configuration
pub use config::{Config, Setting, SettingStore, Settings};

// Page model
pub use dom::{Document, NativeEvent, Node};

// Error types
pub use error::{Error, Result};

// Events
pub use events::{Descriptor, EventKind, KeyChord, Modifiers, ReactionContext, Reactions, Scheduler};

// Logging
pub use logging::{GuiSink, GuiUpdate, LogLevel, LogOptions, Logbook, Logger};

// Proxies
pub use proxy::{AccessMode, ElementProxy, Query, QueryMode, SelectorSpec};

// Reactor
pub use reactor::{Reactor, ReactorBuilder};
