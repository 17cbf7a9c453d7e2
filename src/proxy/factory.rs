//! Builds proxies for resolved elements.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::reactor::Shared;

use super::element::ElementProxy;
use super::mode::QueryMode;
use super::query::{Resolved, SelectorSpec};

// ============================================================================
// Factory
// ============================================================================

/// Resolves `spec` and returns one proxy per element.
///
/// Cached proxies are reused whatever `mode` asks for. New proxies are
/// named after `base` and cached unless static. Once the reactor is gone
/// nothing is cached any more.
///
/// # Errors
///
/// - [`Error::InvalidSelector`] if a selector does not parse
/// - [`Error::NotAnElement`] if a resolved node is not an element
pub(crate) fn build(
    shared: &Arc<Shared>,
    spec: &SelectorSpec,
    base: &str,
    mode: QueryMode,
) -> Result<Vec<ElementProxy>> {
    spec.resolve(&shared.document)?
        .into_iter()
        .enumerate()
        .map(|(idx, resolved)| to_proxy(shared, spec, resolved, base, idx, mode))
        .collect()
}

fn to_proxy(
    shared: &Arc<Shared>,
    spec: &SelectorSpec,
    resolved: Resolved,
    base: &str,
    idx: usize,
    mode: QueryMode,
) -> Result<ElementProxy> {
    let Resolved { node, source_index } = resolved;
    if !node.is_element() {
        return Err(Error::not_an_element(node.describe()));
    }

    let cache = shared.cache.upgrade();
    if let Some(cached) = cache.as_ref().and_then(|cache| cache.lock().get(&node)) {
        let requested = mode.access_mode();
        if !mode.is_fresh() && cached.mode() != requested {
            debug!(
                name = %cached.name(),
                cached = %cached.mode(),
                requested = %requested,
                "Mode change on cached proxy ignored"
            );
        }
        return Ok(cached);
    }

    let access = mode.access_mode();
    let proxy = ElementProxy::new(
        Arc::clone(shared),
        &node,
        base,
        idx,
        access,
        spec.fresh_for(source_index),
    );
    if !access.is_static()
        && let Some(cache) = cache
    {
        cache.lock().insert(&proxy);
    }
    Ok(proxy)
}
