//! Event reactions.
//!
//! This module turns declared reactions into deferred work triggered by
//! native events:
//!
//! | Type | Description |
//! |------|-------------|
//! | [`KeyChord`] | Normalized modifier + key text, e.g. `CtrlShiftA` |
//! | [`Descriptor`] | Parsed reaction key, e.g. `onKeydown_CtrlEnter` |
//! | [`Reactions`] | Declared callbacks by reaction key |
//! | [`ReactionProcessor`] | Binds, debounces and expands declarations |
//! | [`ReactionStore`] | Per-element reaction registry |
//! | [`DocumentDispatcher`] | Routes native events to stored reactions |
//! | [`Scheduler`] | Deferred job queue |
//!
//! # Dispatch
//!
//! ```text
//! native event ─► DocumentDispatcher ─► [coarse, specific] descriptors
//!                        │                        │
//!                        │           ReactionStore (target, then document)
//!                        ▼                        │
//!                 prevent_default                 ▼
//!                                           Scheduler ─► reactions run later
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Event kinds, descriptors and the event stringifier.
pub mod descriptor;

/// Document-level dispatcher.
pub mod dispatcher;

/// Modifier keys and key chords.
pub mod key;

/// Declarations, contexts and processing.
pub mod reaction;

/// Deferred job queue.
pub mod scheduler;

/// Per-element reaction registry.
pub mod store;

// ============================================================================
// Re-exports
// ============================================================================

pub use descriptor::{Descriptor, EventKind, event_chord, event_descriptors, event_string};
pub use dispatcher::{DEFAULT_PREVENTED, DocumentDispatcher};
pub use key::{KeyChord, Modifiers};
pub use reaction::{
    Callback, Debounce, Declared, Processed, Reaction, ReactionContext, ReactionProcessor,
    Reactions,
};
pub use scheduler::{Job, Scheduler};
pub use store::ReactionStore;
