//! Safe value setter and touch events.

// ============================================================================
// Imports
// ============================================================================

use futures_util::FutureExt;
use serde_json::json;
use tracing::{debug, trace};

use crate::dom::{NativeEvent, WeakNode};
use crate::error::{Error, Result};
use crate::logging::{LogLevel, LogOptions};
use crate::reactor::Shared;

use super::element::ElementProxy;

// ============================================================================
// Constants
// ============================================================================

/// Element types whose value a proxy may write.
pub const EDITABLE_ELEMENT_TYPES: &[&str] = &["textarea", "select-one", "text"];

/// Events dispatched by a touch, in order.
const TOUCH_EVENTS: &[&str] = &["blur", "change", "input", "keydown"];

// ============================================================================
// Setter
// ============================================================================

/// Writes `new_value` into the element of `proxy`.
///
/// Equal values are left alone. Otherwise the value is written, a touch is
/// scheduled and the change is logged. Elements without a value never
/// compare equal, so they always reach the type check.
pub(crate) fn safe_set(proxy: &ElementProxy, new_value: String) -> Result<()> {
    let shared = &proxy.inner.shared;
    let Some(node) = proxy.node() else {
        trace!(name = %proxy.name(), "Value write to dropped element skipped");
        return Ok(());
    };
    let old_value = node.value();

    if old_value.as_deref() == Some(new_value.as_str()) {
        shared.logger.log(
            LogLevel::Low,
            &format!("No change to {}.", proxy.name()),
            LogOptions::quiet(),
        );
        return Ok(());
    }

    let element_type = node.element_type();
    if !EDITABLE_ELEMENT_TYPES.contains(&element_type.as_str()) {
        return Err(Error::unsupported_element_type(element_type));
    }

    node.set_value(new_value.as_str());
    proxy.touch();
    let old_value = old_value.unwrap_or_default();
    shared.logger.log(
        LogLevel::ChangeValue,
        &format!("{} '{old_value}' => '{new_value}'.", proxy.name()),
        LogOptions {
            debug: true,
            print: false,
            save: true,
            toast: false,
        },
    );
    Ok(())
}

// ============================================================================
// Touch
// ============================================================================

/// Queues the touch events of `target` after the configured delay.
pub(crate) fn schedule_touch(shared: &Shared, target: &WeakNode, name: &str) {
    let target = target.clone();
    let delay = shared.config.touch_delay();
    debug!(name = %name, delay_ms = delay.as_millis() as u64, "Touch scheduled");

    shared.scheduler.submit(
        format!("touch {name}"),
        async move {
            tokio::time::sleep(delay).await;
            let Some(node) = target.upgrade() else {
                trace!("Touched element dropped before dispatch");
                return Ok(());
            };
            for event_type in TOUCH_EVENTS {
                node.dispatch_event(NativeEvent::custom(*event_type, json!({ "touch": true })));
            }
            Ok(())
        }
        .boxed(),
    );
}
