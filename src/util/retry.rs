//! Retrying and waiting helpers.
//!
//! Flows often act on pages that are still rendering. These helpers poll a
//! condition with a fixed delay before every attempt.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use tracing::{debug, trace};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::proxy::{ElementProxy, SelectorSpec};
use crate::reactor::Reactor;

// ============================================================================
// RetryPolicy
// ============================================================================

/// How often and how patiently to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Number of attempts.
    pub attempts: u32,
    /// Delay before each attempt.
    pub delay: Duration,
    /// Return `Ok(None)` instead of an error when attempts run out.
    pub suppress_error: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl RetryPolicy {
    /// Takes attempts and delay from `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            attempts: config.retries,
            delay: config.retry_delay(),
            suppress_error: false,
        }
    }

    /// Sets the number of attempts.
    #[inline]
    #[must_use]
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    /// Sets the delay before each attempt.
    #[inline]
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns `Ok(None)` instead of failing when attempts run out.
    #[inline]
    #[must_use]
    pub fn suppressed(mut self) -> Self {
        self.suppress_error = true;
        self
    }
}

// ============================================================================
// Functions
// ============================================================================

/// Sleeps for `delay`.
pub async fn wait(delay: Duration) {
    tokio::time::sleep(delay).await;
}

/// Runs `attempt` until it yields a value.
///
/// Errors returned by `attempt` end the retry immediately.
///
/// # Errors
///
/// Returns [`Error::RetryExhausted`] when every attempt yielded `None` and
/// the policy does not suppress errors.
pub async fn retry<T, F>(operation: &str, policy: RetryPolicy, mut attempt: F) -> Result<Option<T>>
where
    F: FnMut() -> Result<Option<T>>,
{
    for n in 1..=policy.attempts {
        wait(policy.delay).await;
        if let Some(value) = attempt()? {
            trace!(operation, attempt = n, "Retry succeeded");
            return Ok(Some(value));
        }
    }

    debug!(operation, attempts = policy.attempts, "Retry exhausted");
    if policy.suppress_error {
        return Ok(None);
    }
    Err(Error::retry_exhausted(operation, policy.attempts))
}

/// Waits until `selector` matches at least one element.
///
/// Returns fresh proxies; nothing is registered.
///
/// # Errors
///
/// - [`Error::InvalidSelector`] at once if the selector does not parse
/// - [`Error::RetryExhausted`] if nothing matched in time
pub async fn wait_for_elements(
    reactor: &Reactor,
    selector: &SelectorSpec,
    policy: RetryPolicy,
) -> Result<Option<Vec<ElementProxy>>> {
    retry("wait_for_elements", policy, || {
        let found = reactor.lookup(selector)?;
        Ok((!found.is_empty()).then_some(found))
    })
    .await
}

/// Waits until the element behind `proxy` is no longer disabled.
///
/// Reads live page state, also for static proxies. A dropped element never
/// becomes enabled.
///
/// # Errors
///
/// Returns [`Error::RetryExhausted`] if the element stayed disabled.
pub async fn wait_until_enabled(proxy: &ElementProxy, policy: RetryPolicy) -> Result<Option<()>> {
    retry("wait_until_enabled", policy, || {
        let enabled = proxy.node().is_some_and(|node| !node.disabled());
        Ok(enabled.then_some(()))
    })
    .await
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::dom::Document;

    fn fast() -> RetryPolicy {
        RetryPolicy::default().with_delay(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_retry_succeeds_late() {
        let mut count = 0;
        let result = retry("late", fast().with_attempts(12), || {
            count += 1;
            Ok((count > 10).then_some(count))
        })
        .await
        .unwrap();
        assert_eq!(result, Some(11));
    }

    #[tokio::test]
    async fn test_retry_exhausted() {
        let mut count = 0;
        let err = retry("late", fast().with_attempts(5), || {
            count += 1;
            Ok((count > 10).then_some(()))
        })
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Failed. Ran late 5 times");
    }

    #[tokio::test]
    async fn test_retry_suppressed() {
        let result = retry("never", fast().with_attempts(3).suppressed(), || Ok(None::<()>))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_retry_propagates_errors() {
        let err = retry("broken", fast(), || Err::<Option<()>, _>(Error::config("bad")))
            .await
            .unwrap_err();
        assert!(err.is_config_error());
    }

    #[tokio::test]
    async fn test_wait_for_elements() {
        let doc = Document::new();
        let reactor = Reactor::new(doc.clone(), Config::default()).unwrap();
        doc.body()
            .append_child(&doc.create_element("textarea"))
            .unwrap();

        let found = wait_for_elements(&reactor, &SelectorSpec::new("textarea"), fast())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.len(), 1);

        let none = wait_for_elements(
            &reactor,
            &SelectorSpec::new("select"),
            fast().with_attempts(2).suppressed(),
        )
        .await
        .unwrap();
        assert!(none.is_none());
    }
}
