//! Element queries.
//!
//! A [`SelectorSpec`] says which elements to find; a [`Query`] adds how to
//! wrap them: display name, styling, reference name, access mode and
//! reactions.
//!
//! # Resolution
//!
//! 1. With a root selector, element `root_number` (default 0) of its matches
//!    is the search root and `select` (default `*`) runs inside it. A missing
//!    root yields no elements.
//! 2. Without one, `select` runs over the whole document.
//! 3. `pick` keeps only the listed indices, in the order given.
//! 4. `with_text` keeps elements whose value or text equals it.
//!
//! Every resolved element remembers its index in the unpicked match list;
//! that index is what a proxy's fresh spec picks.

// ============================================================================
// Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dom::{Document, Node, Selector};
use crate::error::{Error, Result};
use crate::events::{ReactionContext, Reactions};
use crate::util::camel_case;

use super::mode::{AccessMode, QueryMode};

// ============================================================================
// Constants
// ============================================================================

/// Base name of queries without a name.
pub const UNNAMED: &str = "Unnamed";

// ============================================================================
// Types
// ============================================================================

/// CSS property to value.
pub type StyleMap = BTreeMap<String, String>;

/// A resolved element and its index in the unpicked match list.
#[derive(Debug, Clone)]
pub(crate) struct Resolved {
    pub(crate) node: Node,
    pub(crate) source_index: usize,
}

// ============================================================================
// SelectorSpec
// ============================================================================

/// Which elements a query finds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SelectorSpec {
    /// Selector of the search root.
    pub root_select: Option<String>,
    /// Which root match to search in.
    pub root_number: Option<usize>,
    /// Selector of the elements.
    pub select: Option<String>,
    /// Indices to keep.
    pub pick: Option<Vec<usize>>,
    /// Required value or text.
    pub with_text: Option<String>,
}

impl SelectorSpec {
    /// Selects `selector` over the whole document.
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            select: Some(selector.into()),
            ..Self::default()
        }
    }

    /// Searches inside match `number` of `selector`.
    #[inline]
    #[must_use]
    pub fn with_root(mut self, selector: impl Into<String>, number: usize) -> Self {
        self.root_select = Some(selector.into());
        self.root_number = Some(number);
        self
    }

    /// Keeps only the listed indices.
    #[inline]
    #[must_use]
    pub fn with_pick(mut self, pick: impl IntoIterator<Item = usize>) -> Self {
        self.pick = Some(pick.into_iter().collect());
        self
    }

    /// Keeps only elements whose value or text equals `text`.
    #[inline]
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.with_text = Some(text.into());
        self
    }

    /// Returns the spec that finds the element at `source_index` again.
    #[must_use]
    pub fn fresh_for(&self, source_index: usize) -> Self {
        Self {
            pick: Some(vec![source_index]),
            ..self.clone()
        }
    }

    /// Resolves the spec against `document`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSelector`] if a selector does not parse or no
    /// selector was given at all.
    pub(crate) fn resolve(&self, document: &Document) -> Result<Vec<Resolved>> {
        let matches = match &self.root_select {
            Some(root_select) => {
                let root_selector = Selector::parse(root_select)?;
                let selector = Selector::parse(self.select.as_deref().unwrap_or("*"))?;
                let roots = document.root().select_all(&root_selector);
                match roots.get(self.root_number.unwrap_or(0)) {
                    Some(root) => root.select_all(&selector),
                    None => Vec::new(),
                }
            }
            None => {
                let select = self
                    .select
                    .as_deref()
                    .ok_or_else(|| Error::invalid_selector("", "no selector given"))?;
                document.root().select_all(&Selector::parse(select)?)
            }
        };

        let picked: Vec<Resolved> = match &self.pick {
            Some(pick) => pick
                .iter()
                .filter_map(|&i| {
                    matches.get(i).map(|node| Resolved {
                        node: node.clone(),
                        source_index: i,
                    })
                })
                .collect(),
            None => matches
                .into_iter()
                .enumerate()
                .map(|(source_index, node)| Resolved { node, source_index })
                .collect(),
        };

        Ok(match &self.with_text {
            Some(text) => picked
                .into_iter()
                .filter(|r| {
                    r.node.value().as_deref() == Some(text.as_str()) || r.node.text_content() == *text
                })
                .collect(),
            None => picked,
        })
    }
}

// ============================================================================
// Query
// ============================================================================

/// A full query: selector spec plus how to wrap what it finds.
///
/// # Example
///
/// ```ignore
/// let query = Query::select("textarea")
///     .name("Headline")
///     .reference("headlines")
///     .on("onKeydown_CtrlEnter", |ctx| { /* ... */ Ok(()) });
/// ```
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub(crate) spec: SelectorSpec,
    pub(crate) name: Option<String>,
    pub(crate) css: Option<StyleMap>,
    pub(crate) reference: Option<String>,
    pub(crate) mode: QueryMode,
    pub(crate) reactions: Reactions,
}

impl Query {
    /// Selects `selector` over the whole document.
    #[must_use]
    pub fn select(selector: impl Into<String>) -> Self {
        Self::from_spec(SelectorSpec::new(selector))
    }

    /// Wraps an existing spec.
    #[must_use]
    pub fn from_spec(spec: SelectorSpec) -> Self {
        Self {
            spec,
            ..Self::default()
        }
    }

    /// Searches inside match `number` of `selector`.
    #[must_use]
    pub fn root(mut self, selector: impl Into<String>, number: usize) -> Self {
        self.spec = self.spec.with_root(selector, number);
        self
    }

    /// Keeps only the listed indices.
    #[must_use]
    pub fn pick(mut self, pick: impl IntoIterator<Item = usize>) -> Self {
        self.spec = self.spec.with_pick(pick);
        self
    }

    /// Keeps only elements whose value or text equals `text`.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.spec = self.spec.with_text(text);
        self
    }

    /// Sets the display name base.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Adds a CSS property applied to every resolved element.
    #[must_use]
    pub fn css(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.css
            .get_or_insert_with(StyleMap::new)
            .insert(property.into(), value.into());
        self
    }

    /// Stores the result under `name` in the reference registry.
    #[must_use]
    pub fn reference(mut self, name: impl Into<String>) -> Self {
        self.reference = Some(name.into());
        self
    }

    /// Sets the access mode of the built proxies.
    #[must_use]
    pub fn mode(mut self, mode: AccessMode) -> Self {
        self.mode = QueryMode::Attach(mode);
        self
    }

    /// Builds static proxies without caching or reactions.
    #[must_use]
    pub fn fresh(mut self) -> Self {
        self.mode = QueryMode::Fresh;
        self
    }

    /// Adds a reaction.
    #[must_use]
    pub fn on<F>(mut self, key: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&ReactionContext) -> crate::Result<()> + Send + Sync + 'static,
    {
        self.reactions = self.reactions.on(key, callback);
        self
    }

    /// Replaces the declared reactions.
    #[must_use]
    pub fn reactions(mut self, reactions: Reactions) -> Self {
        self.reactions = reactions;
        self
    }

    /// Returns the selector spec.
    #[inline]
    #[must_use]
    pub fn spec(&self) -> &SelectorSpec {
        &self.spec
    }

    /// Returns the query mode.
    #[inline]
    #[must_use]
    pub fn query_mode(&self) -> QueryMode {
        self.mode
    }

    /// Returns the name base, [`UNNAMED`] if none was set.
    #[must_use]
    pub fn base_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNNAMED)
    }
}

/// Display name of element `idx`: camel-cased base plus the 1-based index.
#[must_use]
pub fn indexed_name(base: &str, idx: usize) -> String {
    format!("{}_{}", camel_case(base), idx + 1)
}

// ============================================================================
// Tests
// ============================================================================
