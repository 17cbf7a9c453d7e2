//! Event kinds, reaction descriptors and the event stringifier.
//!
//! A reaction key such as `onKeydown_CtrlEnter` is parsed once, at
//! registration, into a [`Descriptor`]: an [`EventKind`] plus an optional
//! [`KeyChord`]. A descriptor without a chord is *coarse* and matches every
//! event of its kind; a descriptor with a chord is *specific* and matches
//! only events whose chord is equal.
//!
//! Every native event yields exactly two descriptors, coarse first, so
//! looking up both is how a single dispatch finds every reaction that
//! applies.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use crate::dom::NativeEvent;
use crate::error::{Error, Result};
use crate::util::bulleted_list;

use super::key::{KeyChord, Modifiers};

// ============================================================================
// EventKind
// ============================================================================

/// The supported reaction events.
///
/// [`Interact`](Self::Interact) and [`Load`](Self::Load) are synthetic:
/// they are never dispatched by the page, they are expanded when reactions
/// are processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    /// Committed value change.
    Change,
    /// Mouse click.
    Click,
    /// Focus entering an element.
    Focusin,
    /// Focus leaving an element.
    Focusout,
    /// Any of click, input, keydown or paste.
    Interact,
    /// Key press.
    Keydown,
    /// Value edit.
    Input,
    /// Runs once, right after registration.
    Load,
    /// Clipboard paste.
    Paste,
}

impl EventKind {
    /// Every supported kind, in allow-list order.
    pub const ALL: [EventKind; 9] = [
        Self::Change,
        Self::Click,
        Self::Focusin,
        Self::Focusout,
        Self::Interact,
        Self::Keydown,
        Self::Input,
        Self::Load,
        Self::Paste,
    ];

    /// Kinds an `onInteract` reaction is spread to.
    pub const INTERACT_TARGETS: [EventKind; 4] =
        [Self::Click, Self::Input, Self::Keydown, Self::Paste];

    /// Native event type, e.g. `keydown`.
    #[must_use]
    pub const fn event_type(self) -> &'static str {
        match self {
            Self::Change => "change",
            Self::Click => "click",
            Self::Focusin => "focusin",
            Self::Focusout => "focusout",
            Self::Interact => "interact",
            Self::Keydown => "keydown",
            Self::Input => "input",
            Self::Load => "load",
            Self::Paste => "paste",
        }
    }

    /// Reaction key, e.g. `onKeydown`.
    #[must_use]
    pub const fn reaction_key(self) -> &'static str {
        match self {
            Self::Change => "onChange",
            Self::Click => "onClick",
            Self::Focusin => "onFocusin",
            Self::Focusout => "onFocusout",
            Self::Interact => "onInteract",
            Self::Keydown => "onKeydown",
            Self::Input => "onInput",
            Self::Load => "onLoad",
            Self::Paste => "onPaste",
        }
    }

    /// Returns `true` for kinds the page never dispatches.
    #[inline]
    #[must_use]
    pub const fn is_synthetic(self) -> bool {
        matches!(self, Self::Interact | Self::Load)
    }

    /// Kinds the document dispatcher listens for.
    pub fn native() -> impl Iterator<Item = EventKind> {
        Self::ALL.into_iter().filter(|k| !k.is_synthetic())
    }

    /// Maps a native event type back to its kind.
    #[must_use]
    pub fn from_event_type(event_type: &str) -> Option<Self> {
        Self::native().find(|k| k.event_type() == event_type)
    }

    fn from_reaction_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.reaction_key() == key)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reaction_key())
    }
}

// ============================================================================
// Descriptor
// ============================================================================

/// A parsed reaction key.
///
/// # Example
///
/// ```ignore
/// let d: Descriptor = "onKeydown_ShiftCtrlA".parse()?;
/// assert_eq!(d.to_string(), "onKeydown_CtrlShiftA");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Descriptor {
    kind: EventKind,
    chord: Option<KeyChord>,
}

impl Descriptor {
    /// Matches every event of `kind`.
    #[inline]
    #[must_use]
    pub fn coarse(kind: EventKind) -> Self {
        Self { kind, chord: None }
    }

    /// Matches events of `kind` whose chord equals `chord`.
    #[inline]
    #[must_use]
    pub fn specific(kind: EventKind, chord: KeyChord) -> Self {
        Self {
            kind,
            chord: Some(chord),
        }
    }

    /// Returns the event kind.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Returns the chord of a specific descriptor.
    #[inline]
    #[must_use]
    pub fn chord(&self) -> Option<&KeyChord> {
        self.chord.as_ref()
    }

    /// Returns `true` for coarse descriptors.
    #[inline]
    #[must_use]
    pub fn is_coarse(&self) -> bool {
        self.chord.is_none()
    }

    /// Returns `true` if `key` looks like a reaction key at all.
    ///
    /// Anything else in a reactions map is ignored rather than rejected.
    #[inline]
    #[must_use]
    pub fn is_reaction_key(key: &str) -> bool {
        key.starts_with("on")
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.reaction_key())?;
        if let Some(chord) = &self.chord {
            write!(f, "_{chord}")?;
        }
        Ok(())
    }
}

impl FromStr for Descriptor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if !Self::is_reaction_key(s) {
            return Err(Error::invalid_descriptor(s, "reaction keys start with 'on'"));
        }

        let (base, suffix) = match s.split_once('_') {
            Some((base, suffix)) => (base, Some(suffix)),
            None => (s, None),
        };

        let kind = EventKind::from_reaction_key(base).ok_or_else(|| Error::UnsupportedEvent {
            event: s.to_string(),
            supported: bulleted_list(EventKind::ALL.iter().map(|k| k.reaction_key())),
        })?;

        let Some(suffix) = suffix else {
            return Ok(Self::coarse(kind));
        };

        if kind != EventKind::Keydown {
            return Err(Error::invalid_descriptor(
                s,
                format!("{kind} does not take a key suffix"),
            ));
        }
        Ok(Self::specific(kind, suffix.parse()?))
    }
}

// ============================================================================
// Event Stringifier
// ============================================================================

/// Returns the chord of a native event.
///
/// Non-keyboard events and keydowns without a key code yield the empty
/// chord.
#[must_use]
pub fn event_chord(event: &NativeEvent) -> KeyChord {
    if event.event_type() != EventKind::Keydown.event_type() {
        return KeyChord::default();
    }
    let Some(code) = event.code() else {
        return KeyChord::default();
    };

    let mut modifiers = Modifiers::empty();
    if event.ctrl_key() || event.meta_key() {
        modifiers |= Modifiers::CTRL;
    }
    if event.shift_key() {
        modifiers |= Modifiers::SHIFT;
    }
    if event.alt_key() {
        modifiers |= Modifiers::ALT;
    }
    KeyChord::from_code(modifiers, code)
}

/// Returns the chord of a native event as text, e.g. `CtrlShiftA`.
#[must_use]
pub fn event_string(event: &NativeEvent) -> String {
    event_chord(event).to_string()
}

/// Returns the coarse and the specific descriptor of a native event, in
/// that order.
///
/// Events outside the supported set yield `None`.
#[must_use]
pub fn event_descriptors(event: &NativeEvent) -> Option<[Descriptor; 2]> {
    let kind = EventKind::from_event_type(event.event_type())?;
    Some([
        Descriptor::coarse(kind),
        Descriptor::specific(kind, event_chord(event)),
    ])
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coarse() {
        let d: Descriptor = "onClick".parse().unwrap();
        assert_eq!(d, Descriptor::coarse(EventKind::Click));
        assert!(d.is_coarse());
    }

    #[test]
    fn test_parse_specific_normalizes() {
        let d: Descriptor = "onKeydown_ShiftCtrlA".parse().unwrap();
        assert_eq!(d.to_string(), "onKeydown_CtrlShiftA");
        assert_eq!(d.kind(), EventKind::Keydown);
    }

    #[test]
    fn test_unsupported_event_lists_allowed() {
        let err = "onHover".parse::<Descriptor>().unwrap_err();
        let Error::UnsupportedEvent { event, supported } = &err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(event, "onHover");
        assert!(supported.contains("* onKeydown"));
        assert!(err.to_string().starts_with("onHover is not a supported event"));
    }

    #[test]
    fn test_suffix_only_on_keydown() {
        assert!(matches!(
            "onClick_CtrlA".parse::<Descriptor>(),
            Err(Error::InvalidDescriptor { .. })
        ));
    }

    #[test]
    fn test_ctrl_a_descriptors() {
        let event = NativeEvent::keydown("KeyA").with_ctrl();
        let [coarse, specific] = event_descriptors(&event).unwrap();
        assert_eq!(coarse.to_string(), "onKeydown");
        assert_eq!(specific.to_string(), "onKeydown_CtrlA");
    }

    #[test]
    fn test_meta_counts_as_ctrl() {
        let event = NativeEvent::keydown("Enter").with_meta();
        assert_eq!(event_string(&event), "CtrlEnter");
    }

    #[test]
    fn test_alt_backspace_event() {
        let event = NativeEvent::keydown("Backspace").with_alt();
        assert_eq!(event_string(&event), "Delete");
    }

    #[test]
    fn test_click_has_empty_chord() {
        let event = NativeEvent::new("click").with_ctrl();
        let [_, specific] = event_descriptors(&event).unwrap();
        assert_eq!(specific.to_string(), "onClick_");
        assert!(specific.chord().unwrap().is_empty());
    }

    #[test]
    fn test_synthetic_keydown_without_code() {
        let event = NativeEvent::new("keydown").with_shift();
        assert_eq!(event_string(&event), "");
    }

    #[test]
    fn test_unsupported_native_event() {
        assert!(event_descriptors(&NativeEvent::new("mouseover")).is_none());
        assert!(event_descriptors(&NativeEvent::new("load")).is_none());
    }

    #[test]
    fn test_native_kinds() {
        let native: Vec<_> = EventKind::native().map(EventKind::event_type).collect();
        assert_eq!(
            native,
            ["change", "click", "focusin", "focusout", "keydown", "input", "paste"]
        );
    }
}
