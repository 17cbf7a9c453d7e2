//! Modifier keys and key chords.
//!
//! A chord is the canonical text form of a keydown: the held modifiers in
//! the fixed order `Ctrl`, `Shift`, `Alt`, followed by the physical key code
//! with any `Key` prefix removed. `Ctrl+Shift+A` is `CtrlShiftA`, `Enter`
//! is `Enter`, a bare modifier press is `Ctrl`.
//!
//! Meta (Cmd) counts as Ctrl. Alt+Backspace is reported as `Delete`.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Modifier display names in canonical order.
const MODIFIER_NAMES: [(Modifiers, &str); 3] = [
    (Modifiers::CTRL, "Ctrl"),
    (Modifiers::SHIFT, "Shift"),
    (Modifiers::ALT, "Alt"),
];

/// Key codes of the modifier keys themselves.
const MODIFIER_CODES: &[&str] = &[
    "ControlLeft",
    "ControlRight",
    "ShiftLeft",
    "ShiftRight",
    "AltLeft",
    "AltRight",
    "MetaLeft",
    "MetaRight",
    "OSLeft",
    "OSRight",
];

// ============================================================================
// Modifiers
// ============================================================================

bitflags! {
    /// Held modifier keys.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// Ctrl or Meta.
        const CTRL = 1;
        /// Shift.
        const SHIFT = 1 << 1;
        /// Alt.
        const ALT = 1 << 2;
    }
}

// ============================================================================
// KeyChord
// ============================================================================

/// A normalized key chord such as `CtrlShiftA`.
///
/// The empty chord (no modifiers, no key) is what every non-keyboard event
/// and every synthetic keydown without a key code produce.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct KeyChord {
    modifiers: Modifiers,
    key: Option<Box<str>>,
}

impl KeyChord {
    /// Creates a chord, applying the Alt+Backspace rewrite.
    #[must_use]
    pub fn new(modifiers: Modifiers, key: Option<&str>) -> Self {
        let key = key.filter(|k| !k.is_empty());
        if modifiers.contains(Modifiers::ALT) && key == Some("Backspace") {
            return Self {
                modifiers: modifiers - Modifiers::ALT,
                key: Some("Delete".into()),
            };
        }
        Self {
            modifiers,
            key: key.map(Into::into),
        }
    }

    /// Creates a chord from a physical key code.
    ///
    /// Modifier key codes contribute no key; `KeyA` becomes `A`.
    #[must_use]
    pub fn from_code(modifiers: Modifiers, code: &str) -> Self {
        if MODIFIER_CODES.contains(&code) {
            return Self::new(modifiers, None);
        }
        Self::new(modifiers, Some(code.strip_prefix("Key").unwrap_or(code)))
    }

    /// Returns the held modifiers.
    #[inline]
    #[must_use]
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Returns the key without modifiers.
    #[inline]
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Returns `true` for the empty chord.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty() && self.key.is_none()
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, name) in MODIFIER_NAMES {
            if self.modifiers.contains(flag) {
                f.write_str(name)?;
            }
        }
        if let Some(key) = &self.key {
            f.write_str(key)?;
        }
        Ok(())
    }
}

impl FromStr for KeyChord {
    type Err = Error;

    /// Parses a chord, accepting modifiers in any order.
    ///
    /// `ShiftCtrlA` and `CtrlShiftA` parse to the same chord.
    fn from_str(s: &str) -> Result<Self> {
        let mut modifiers = Modifiers::empty();
        let mut rest = s;
        'outer: loop {
            for (flag, name) in MODIFIER_NAMES {
                if let Some(tail) = rest.strip_prefix(name) {
                    if modifiers.contains(flag) {
                        return Err(Error::invalid_descriptor(
                            s,
                            format!("modifier {name} repeated"),
                        ));
                    }
                    modifiers |= flag;
                    rest = tail;
                    continue 'outer;
                }
            }
            break;
        }

        if !rest.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::invalid_descriptor(
                s,
                format!("'{rest}' is not a key code"),
            ));
        }

        Ok(Self::new(modifiers, Some(rest)))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    #[test]
    fn test_display_canonical_order() {
        let chord = KeyChord::new(Modifiers::ALT | Modifiers::CTRL | Modifiers::SHIFT, Some("A"));
        assert_eq!(chord.to_string(), "CtrlShiftAltA");
    }

    #[test]
    fn test_from_code_strips_key_prefix() {
        let chord = KeyChord::from_code(Modifiers::CTRL, "KeyA");
        assert_eq!(chord.to_string(), "CtrlA");
        assert_eq!(KeyChord::from_code(Modifiers::empty(), "Enter").to_string(), "Enter");
    }

    #[test]
    fn test_modifier_only_press() {
        let chord = KeyChord::from_code(Modifiers::CTRL, "ControlLeft");
        assert_eq!(chord.to_string(), "Ctrl");
        assert_eq!(chord.key(), None);
    }

    #[test]
    fn test_alt_backspace_is_delete() {
        let chord = KeyChord::from_code(Modifiers::ALT, "Backspace");
        assert_eq!(chord.to_string(), "Delete");

        let chord = KeyChord::from_code(Modifiers::CTRL | Modifiers::ALT, "Backspace");
        assert_eq!(chord.to_string(), "CtrlDelete");
    }

    #[test]
    fn test_parse_normalizes_order() {
        let a: KeyChord = "ShiftCtrlA".parse().unwrap();
        let b: KeyChord = "CtrlShiftA".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "CtrlShiftA");
    }

    #[test]
    fn test_parse_empty_and_bare() {
        assert!("".parse::<KeyChord>().unwrap().is_empty());
        let ctrl: KeyChord = "Ctrl".parse().unwrap();
        assert_eq!(ctrl.modifiers(), Modifiers::CTRL);
        assert_eq!(ctrl.key(), None);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("Ctrl+A".parse::<KeyChord>().is_err());
        assert!("CtrlCtrlA".parse::<KeyChord>().is_err());
    }

    proptest! {
        #[test]
        fn prop_modifier_order_is_irrelevant(
            ctrl in any::<bool>(),
            shift in any::<bool>(),
            alt in any::<bool>(),
            key in "[A-Z][a-z0-9]{0,6}",
            rotate in 0usize..3,
        ) {
            prop_assume!(MODIFIER_NAMES.iter().all(|(_, n)| !key.starts_with(n)));
            let mut names: Vec<&str> = Vec::new();
            if ctrl { names.push("Ctrl"); }
            if shift { names.push("Shift"); }
            if alt { names.push("Alt"); }
            let canonical = format!("{}{key}", names.concat());
            if !names.is_empty() {
                let by = rotate % names.len();
                names.rotate_left(by);
            }
            let shuffled = format!("{}{key}", names.concat());

            let a: KeyChord = canonical.parse().unwrap();
            let b: KeyChord = shuffled.parse().unwrap();
            prop_assert_eq!(&a, &b);
            prop_assert_eq!(a.to_string(), b.to_string());
        }
    }
}
