//! Native events and document-level listeners.

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;

use super::node::Node;

// ============================================================================
// Constants
// ============================================================================

/// Event types that do not bubble.
const NON_BUBBLING: &[&str] = &["blur", "focus", "load"];

// ============================================================================
// NativeEvent
// ============================================================================

/// An event as the page would see it: a type string, modifier flags, the
/// physical key code for keyboard events, and an optional payload.
///
/// # Example
///
/// ```ignore
/// let event = NativeEvent::keydown("KeyA").with_ctrl().with_shift();
/// input.dispatch_event(event);
/// ```
#[derive(Debug, Clone)]
pub struct NativeEvent {
    event_type: String,
    target: Option<Node>,
    ctrl_key: bool,
    shift_key: bool,
    alt_key: bool,
    meta_key: bool,
    code: Option<String>,
    detail: Option<Value>,
    bubbles: bool,
    default_prevented: bool,
}

// ============================================================================
// NativeEvent - Constructors
// ============================================================================

impl NativeEvent {
    /// Creates an event of the given type.
    ///
    /// `blur`, `focus` and `load` do not bubble; everything else does.
    #[must_use]
    pub fn new(event_type: impl Into<String>) -> Self {
        let event_type = event_type.into();
        let bubbles = !NON_BUBBLING.contains(&event_type.as_str());
        Self {
            event_type,
            target: None,
            ctrl_key: false,
            shift_key: false,
            alt_key: false,
            meta_key: false,
            code: None,
            detail: None,
            bubbles,
            default_prevented: false,
        }
    }

    /// Creates a keydown event for a physical key code (`KeyA`, `Enter`).
    #[must_use]
    pub fn keydown(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Self::new("keydown")
        }
    }

    /// Creates a bubbling event carrying a payload, without key code.
    #[must_use]
    pub fn custom(event_type: impl Into<String>, detail: Value) -> Self {
        Self {
            detail: Some(detail),
            bubbles: true,
            ..Self::new(event_type)
        }
    }
}

// ============================================================================
// NativeEvent - Builder Methods
// ============================================================================

impl NativeEvent {
    /// Holds Ctrl.
    #[inline]
    #[must_use]
    pub fn with_ctrl(mut self) -> Self {
        self.ctrl_key = true;
        self
    }

    /// Holds Shift.
    #[inline]
    #[must_use]
    pub fn with_shift(mut self) -> Self {
        self.shift_key = true;
        self
    }

    /// Holds Alt.
    #[inline]
    #[must_use]
    pub fn with_alt(mut self) -> Self {
        self.alt_key = true;
        self
    }

    /// Holds Meta (Cmd).
    #[inline]
    #[must_use]
    pub fn with_meta(mut self) -> Self {
        self.meta_key = true;
        self
    }

    /// Sets the physical key code.
    #[inline]
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

// ============================================================================
// NativeEvent - Accessors
// ============================================================================

impl NativeEvent {
    /// Returns the event type, e.g. `keydown`.
    #[inline]
    #[must_use]
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Returns the target, set on dispatch.
    #[inline]
    #[must_use]
    pub fn target(&self) -> Option<&Node> {
        self.target.as_ref()
    }

    pub(crate) fn set_target(&mut self, target: &Node) {
        self.target = Some(target.clone());
    }

    /// Ctrl held.
    #[inline]
    #[must_use]
    pub fn ctrl_key(&self) -> bool {
        self.ctrl_key
    }

    /// Shift held.
    #[inline]
    #[must_use]
    pub fn shift_key(&self) -> bool {
        self.shift_key
    }

    /// Alt held.
    #[inline]
    #[must_use]
    pub fn alt_key(&self) -> bool {
        self.alt_key
    }

    /// Meta held.
    #[inline]
    #[must_use]
    pub fn meta_key(&self) -> bool {
        self.meta_key
    }

    /// Physical key code; `None` for synthetic keyboard events.
    #[inline]
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref().filter(|c| !c.is_empty())
    }

    /// Payload of custom events.
    #[inline]
    #[must_use]
    pub fn detail(&self) -> Option<&Value> {
        self.detail.as_ref()
    }

    /// Whether the event reaches document-level listeners.
    #[inline]
    #[must_use]
    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    /// Cancels the browser's default action.
    #[inline]
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Returns `true` once a listener called [`prevent_default`](Self::prevent_default).
    #[inline]
    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

// ============================================================================
// EventListener
// ============================================================================

/// A document-level listener.
///
/// Implemented for any `Fn(&mut NativeEvent) + Send + Sync` closure.
pub trait EventListener: Send + Sync {
    /// Handles one dispatched event.
    fn handle_event(&self, event: &mut NativeEvent);
}

impl<F> EventListener for F
where
    F: Fn(&mut NativeEvent) + Send + Sync,
{
    fn handle_event(&self, event: &mut NativeEvent) {
        self(event)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_bubbling_defaults() {
        assert!(NativeEvent::new("click").bubbles());
        assert!(NativeEvent::new("focusout").bubbles());
        assert!(!NativeEvent::new("blur").bubbles());
        assert!(NativeEvent::custom("blur", json!({"touch": true})).bubbles());
    }

    #[test]
    fn test_keydown_builder() {
        let event = NativeEvent::keydown("KeyA").with_ctrl().with_alt();
        assert_eq!(event.event_type(), "keydown");
        assert_eq!(event.code(), Some("KeyA"));
        assert!(event.ctrl_key() && event.alt_key());
        assert!(!event.shift_key() && !event.meta_key());
    }

    #[test]
    fn test_empty_code_is_none() {
        let event = NativeEvent::new("keydown").with_code("");
        assert_eq!(event.code(), None);
    }

    #[test]
    fn test_prevent_default() {
        let mut event = NativeEvent::new("keydown");
        assert!(!event.default_prevented());
        event.prevent_default();
        assert!(event.default_prevented());
    }
}
