//! Proxy access modes.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// AccessMode
// ============================================================================

/// What a proxy lets a flow do to its element.
///
/// | Mode | Reads | Value writes | Other writes |
/// |------|-------|--------------|--------------|
/// | `Static` | snapshot | refused | refused |
/// | `Programmable` | live | safe setter | allowed |
/// | `UserEditable` | live | refused | allowed |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessMode {
    /// Frozen snapshot.
    Static,
    /// Value writes go through the safe setter.
    #[default]
    Programmable,
    /// The value belongs to the user.
    UserEditable,
}

impl AccessMode {
    /// Mode name, e.g. `user-editable`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Programmable => "programmable",
            Self::UserEditable => "user-editable",
        }
    }

    /// Returns `true` if the proxy is a frozen snapshot.
    #[inline]
    #[must_use]
    pub const fn is_static(self) -> bool {
        matches!(self, Self::Static)
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// QueryMode
// ============================================================================

/// How a query treats the proxies it resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueryMode {
    /// Build proxies in this mode, cache them and register reactions.
    Attach(AccessMode),
    /// Build static proxies without caching or reactions.
    Fresh,
}

impl Default for QueryMode {
    fn default() -> Self {
        Self::Attach(AccessMode::default())
    }
}

impl QueryMode {
    /// Mode of the proxies the query builds.
    #[must_use]
    pub const fn access_mode(self) -> AccessMode {
        match self {
            Self::Attach(mode) => mode,
            Self::Fresh => AccessMode::Static,
        }
    }

    /// Returns `true` for [`QueryMode::Fresh`].
    #[inline]
    #[must_use]
    pub const fn is_fresh(self) -> bool {
        matches!(self, Self::Fresh)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_programmable() {
        assert_eq!(AccessMode::default(), AccessMode::Programmable);
        assert_eq!(QueryMode::default().access_mode(), AccessMode::Programmable);
    }

    #[test]
    fn test_fresh_builds_static() {
        assert_eq!(QueryMode::Fresh.access_mode(), AccessMode::Static);
        assert!(QueryMode::Fresh.is_fresh());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&AccessMode::UserEditable).unwrap();
        assert_eq!(json, "\"user-editable\"");
        let mode: AccessMode = serde_json::from_str("\"static\"").unwrap();
        assert!(mode.is_static());
    }
}
