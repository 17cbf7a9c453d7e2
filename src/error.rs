//! Error types for dom-reactor.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use dom_reactor::{Query, Result};
//!
//! fn example(reactor: &Reactor) -> Result<()> {
//!     let inputs = reactor.query(Query::select("textarea").name("Headline"))?;
//!     inputs[0].set_value("Fresh offers")?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::UnsupportedEvent`], [`Error::InvalidDescriptor`], [`Error::EmptyReaction`], [`Error::InvalidSelector`] |
//! | Resolution | [`Error::NotAnElement`], [`Error::Hierarchy`], [`Error::ReferenceNotFound`] |
//! | Policy | [`Error::StaticProxy`], [`Error::NotProgrammable`], [`Error::UnsupportedElementType`] |
//! | Transient | [`Error::RetryExhausted`], [`Error::Timeout`] |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::Url`], [`Error::Regex`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when a [`Config`](crate::Config) value is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Reaction key names an event outside the allow-list.
    #[error("{event} is not a supported event. Please use:{supported}")]
    UnsupportedEvent {
        /// The rejected reaction key.
        event: String,
        /// Bulleted list of the supported events.
        supported: String,
    },

    /// Reaction key could not be parsed into a descriptor.
    #[error("Invalid event descriptor '{descriptor}': {message}")]
    InvalidDescriptor {
        /// The rejected reaction key.
        descriptor: String,
        /// Why it was rejected.
        message: String,
    },

    /// A reaction key was declared without any callback.
    #[error("Failed to add '{event}' reaction to {name}. No reaction functions given.")]
    EmptyReaction {
        /// Display name of the query that declared the reaction.
        name: String,
        /// The reaction key.
        event: String,
    },

    /// CSS selector could not be parsed.
    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector {
        /// The selector text.
        selector: String,
        /// Parser message.
        message: String,
    },

    // ========================================================================
    // Resolution Errors
    // ========================================================================
    /// A node that is neither an element nor the document was used as a
    /// proxy or reaction target.
    #[error("Not an element: {node}")]
    NotAnElement {
        /// Short description of the offending node.
        node: String,
    },

    /// A tree mutation would produce an invalid document.
    #[error("Hierarchy error: {message}")]
    Hierarchy {
        /// Description of the rejected mutation.
        message: String,
    },

    /// No group is stored under this reference name.
    #[error("Reference not found: {name}")]
    ReferenceNotFound {
        /// The missing reference name.
        name: String,
    },

    // ========================================================================
    // Policy Errors
    // ========================================================================
    /// Mutation attempted on a frozen proxy.
    #[error("Cannot change {property} of {name}. Proxy is static.")]
    StaticProxy {
        /// Proxy display name.
        name: String,
        /// The property that was written.
        property: &'static str,
    },

    /// Value write attempted on a user-editable proxy.
    #[error(
        "Cannot set value of {name} to '{value}'. Element is not programmatically editable."
    )]
    NotProgrammable {
        /// Proxy display name.
        name: String,
        /// The rejected value.
        value: String,
    },

    /// Value write attempted on an element type outside the editable set.
    #[error("Cannot set value on {element_type} elements")]
    UnsupportedElementType {
        /// The element's form control type (may be empty).
        element_type: String,
    },

    // ========================================================================
    // Transient Errors
    // ========================================================================
    /// A retried operation never succeeded.
    #[error("Failed. Ran {operation} {attempts} times")]
    RetryExhausted {
        /// Description of the retried operation.
        operation: String,
        /// Number of attempts made.
        attempts: u32,
    },

    /// Operation timeout.
    #[error("Timeout after {timeout_ms}ms: {operation}")]
    Timeout {
        /// Description of the operation that timed out.
        operation: String,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parse error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Regular expression error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid descriptor error.
    #[inline]
    pub fn invalid_descriptor(descriptor: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            descriptor: descriptor.into(),
            message: message.into(),
        }
    }

    /// Creates an empty reaction error.
    #[inline]
    pub fn empty_reaction(name: impl Into<String>, event: impl Into<String>) -> Self {
        Self::EmptyReaction {
            name: name.into(),
            event: event.into(),
        }
    }

    /// Creates an invalid selector error.
    #[inline]
    pub fn invalid_selector(selector: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.into(),
            message: message.into(),
        }
    }

    /// Creates a not-an-element error.
    #[inline]
    pub fn not_an_element(node: impl Into<String>) -> Self {
        Self::NotAnElement { node: node.into() }
    }

    /// Creates a hierarchy error.
    #[inline]
    pub fn hierarchy(message: impl Into<String>) -> Self {
        Self::Hierarchy {
            message: message.into(),
        }
    }

    /// Creates a reference not found error.
    #[inline]
    pub fn reference_not_found(name: impl Into<String>) -> Self {
        Self::ReferenceNotFound { name: name.into() }
    }

    /// Creates a static proxy error.
    #[inline]
    pub fn static_proxy(name: impl Into<String>, property: &'static str) -> Self {
        Self::StaticProxy {
            name: name.into(),
            property,
        }
    }

    /// Creates a not-programmable error.
    #[inline]
    pub fn not_programmable(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::NotProgrammable {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Creates an unsupported element type error.
    #[inline]
    pub fn unsupported_element_type(element_type: impl Into<String>) -> Self {
        Self::UnsupportedElementType {
            element_type: element_type.into(),
        }
    }

    /// Creates a retry exhausted error.
    #[inline]
    pub fn retry_exhausted(operation: impl Into<String>, attempts: u32) -> Self {
        Self::RetryExhausted {
            operation: operation.into(),
            attempts,
        }
    }

    /// Creates a timeout error.
    #[inline]
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this error points at a mistake in a flow's
    /// declarations rather than at page state.
    #[inline]
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::Config { .. }
                | Self::UnsupportedEvent { .. }
                | Self::InvalidDescriptor { .. }
                | Self::EmptyReaction { .. }
                | Self::InvalidSelector { .. }
        )
    }

    /// Returns `true` if a write was refused by the proxy access policy.
    #[inline]
    #[must_use]
    pub fn is_policy_violation(&self) -> bool {
        matches!(
            self,
            Self::StaticProxy { .. }
                | Self::NotProgrammable { .. }
                | Self::UnsupportedElementType { .. }
        )
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Recoverable errors may succeed once the page settles.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::RetryExhausted { .. } | Self::Timeout { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::ErrorKind;

    #[test]
    fn test_error_display() {
        let err = Error::unsupported_element_type("checkbox");
        assert_eq!(err.to_string(), "Cannot set value on checkbox elements");
    }

    #[test]
    fn test_not_programmable_display() {
        let err = Error::not_programmable("Headline_1", "abc");
        assert_eq!(
            err.to_string(),
            "Cannot set value of Headline_1 to 'abc'. Element is not programmatically editable."
        );
    }

    #[test]
    fn test_is_config_error() {
        assert!(Error::config("bad").is_config_error());
        assert!(Error::empty_reaction("Name", "onClick").is_config_error());
        assert!(!Error::static_proxy("Name_1", "value").is_config_error());
    }

    #[test]
    fn test_is_policy_violation() {
        assert!(Error::static_proxy("Name_1", "value").is_policy_violation());
        assert!(Error::not_programmable("Name_1", "x").is_policy_violation());
        assert!(!Error::reference_not_found("x").is_policy_violation());
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::retry_exhausted("find", 20).is_recoverable());
        assert!(!Error::config("test").is_recoverable());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = IoError::new(ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
