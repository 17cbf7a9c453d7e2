//! Helpers shared by flows.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`actions`] | [`attention`], [`swap_values`], [`duplicate_values`] |
//! | [`counter`] | Task counters |
//! | [`retry`] | [`retry()`](retry::retry), [`wait_for_elements`], [`wait_until_enabled`] |
//! | [`text`] | Bulleted lists, capitalisation, `/pattern/flags` |
//! | [`web`] | [`get_domain`], [`normalise_url`] |

// ============================================================================
// Submodules
// ============================================================================

/// Actions on groups of proxies.
pub mod actions;

/// Task counters.
pub mod counter;

/// Retrying and waiting.
pub mod retry;

/// Text helpers.
pub mod text;

/// URL helpers.
pub mod web;

// ============================================================================
// Re-exports
// ============================================================================

pub use actions::{Attention, attention, duplicate_values, swap_values};
pub use counter::{CounterEntry, Counters};
pub use retry::{RetryPolicy, retry, wait, wait_for_elements, wait_until_enabled};
pub use text::{bulleted_list, camel_case, each_word, first_letter, to_regex};
pub use web::{get_domain, normalise_url};
