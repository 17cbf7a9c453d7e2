//! Small actions on groups of proxies.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::proxy::ElementProxy;

// ============================================================================
// Attention
// ============================================================================

/// Something [`attention`] can do to an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attention {
    /// Click it.
    Click,
    /// Focus it.
    Focus,
    /// Scroll it into view.
    ScrollIntoView,
}

impl Attention {
    /// Parses a comma separated list such as `"focus, scrollIntoView"`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an unknown action.
    pub fn parse_list(list: &str) -> Result<Vec<Self>> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl FromStr for Attention {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "click" => Ok(Self::Click),
            "focus" => Ok(Self::Focus),
            "scrollIntoView" => Ok(Self::ScrollIntoView),
            other => Err(Error::config(format!("unknown attention action '{other}'"))),
        }
    }
}

impl fmt::Display for Attention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Click => "click",
            Self::Focus => "focus",
            Self::ScrollIntoView => "scrollIntoView",
        })
    }
}

// ============================================================================
// Functions
// ============================================================================

/// Applies `actions` to element `n` of `proxies`, in the order click, focus,
/// scroll.
///
/// Returns `false` if there is no element `n`.
pub fn attention(proxies: &[ElementProxy], n: usize, actions: &[Attention]) -> bool {
    let Some(proxy) = proxies.get(n) else {
        return false;
    };
    if actions.contains(&Attention::Click) {
        proxy.click();
    }
    if actions.contains(&Attention::Focus) {
        proxy.focus();
    }
    if actions.contains(&Attention::ScrollIntoView) {
        proxy.scroll_into_view();
    }
    true
}

/// Exchanges the values of two proxies.
///
/// # Errors
///
/// Propagates the access policy errors of either write.
pub fn swap_values(one: &ElementProxy, two: &ElementProxy) -> Result<()> {
    let first = one.value().unwrap_or_default();
    let second = two.value().unwrap_or_default();
    one.set_value(second)?;
    two.set_value(first)
}

/// Returns the proxies whose non-empty value also occurs on another proxy
/// of the group, in group order.
#[must_use]
pub fn duplicate_values(proxies: &[ElementProxy]) -> Vec<ElementProxy> {
    let values: Vec<String> = proxies
        .iter()
        .map(|p| p.value().unwrap_or_default())
        .collect();
    proxies
        .iter()
        .zip(&values)
        .filter(|(_, value)| !value.is_empty() && values.iter().filter(|v| v == value).count() > 1)
        .map(|(proxy, _)| proxy.clone())
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::Config;
    use crate::dom::Document;
    use crate::proxy::Query;
    use crate::reactor::Reactor;

    fn page(values: &[&str]) -> (Document, Reactor, Vec<ElementProxy>) {
        let doc = Document::new();
        for value in values {
            doc.body()
                .append_child(&doc.create_element("textarea").with_value(*value))
                .unwrap();
        }
        let reactor = Reactor::new(doc.clone(), Config::default()).unwrap();
        let proxies = reactor.query(Query::select("textarea")).unwrap();
        (doc, reactor, proxies)
    }

    #[test]
    fn test_attention_out_of_range() {
        let (_doc, _reactor, proxies) = page(&["a"]);
        assert!(!attention(&proxies, 1, &[Attention::Click]));
        assert!(!attention(&[], 0, &[Attention::Click]));
    }

    #[test]
    fn test_attention_focus_and_scroll() {
        let (doc, _reactor, proxies) = page(&["a", "b"]);
        let actions = Attention::parse_list("focus, scrollIntoView").unwrap();
        assert!(attention(&proxies, 1, &actions));
        assert_eq!(doc.active_element(), proxies[1].node());
        assert_eq!(doc.scrolled_into_view(), proxies[1].node());
    }

    #[test]
    fn test_parse_list_rejects_unknown() {
        assert!(Attention::parse_list("click, hover").is_err());
    }

    #[test]
    fn test_swap_values() {
        let (_doc, _reactor, proxies) = page(&["one", "two"]);
        swap_values(&proxies[0], &proxies[1]).unwrap();
        assert_eq!(proxies[0].value().as_deref(), Some("two"));
        assert_eq!(proxies[1].value().as_deref(), Some("one"));
    }

    #[test]
    fn test_duplicate_values() {
        let (_doc, _reactor, proxies) = page(&["a", "", "b", "a", ""]);
        let dupes = duplicate_values(&proxies);
        assert_eq!(dupes.len(), 2);
        assert_eq!(dupes[0], proxies[0]);
        assert_eq!(dupes[1], proxies[3]);
    }
}
