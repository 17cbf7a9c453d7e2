//! CSS selector parsing and matching.
//!
//! Supports the subset review flows rely on:
//!
//! | Syntax | Meaning |
//! |--------|---------|
//! | `*`, `div` | universal, type |
//! | `#id`, `.class` | id, class |
//! | `[a]`, `[a=v]`, `[a~=v]`, `[a^=v]`, `[a$=v]`, `[a*=v]` | attribute |
//! | `A B`, `A > B` | descendant, child |
//! | `A, B` | selector list |
//!
//! Pseudo-classes are rejected with [`Error::InvalidSelector`].

// ============================================================================
// Imports
// ============================================================================

use std::iter::Peekable;
use std::str::Chars;

use crate::error::{Error, Result};

use super::node::Node;

// ============================================================================
// Types
// ============================================================================

/// One condition of a compound selector.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SimpleSelector {
    /// `*`
    Universal,
    /// `div`
    Tag(Box<str>),
    /// `#id`
    Id(Box<str>),
    /// `.class`
    Class(Box<str>),
    /// `[attr]`
    AttrExists(Box<str>),
    /// `[attr=value]`
    AttrEquals(Box<str>, Box<str>),
    /// `[attr~=value]`
    AttrIncludes(Box<str>, Box<str>),
    /// `[attr^=value]`
    AttrPrefix(Box<str>, Box<str>),
    /// `[attr$=value]`
    AttrSuffix(Box<str>, Box<str>),
    /// `[attr*=value]`
    AttrSubstring(Box<str>, Box<str>),
}

impl SimpleSelector {
    fn matches(&self, node: &Node) -> bool {
        match self {
            Self::Universal => true,
            Self::Tag(tag) => node.tag_name() == Some(&**tag),
            Self::Id(id) => node.attribute("id").as_deref() == Some(&**id),
            Self::Class(class) => node.classes().iter().any(|c| c.as_str() == &**class),
            Self::AttrExists(name) => node.has_attribute(name),
            Self::AttrEquals(name, value) => attr_matches(node, name, |v| v == &**value),
            Self::AttrIncludes(name, value) => {
                attr_matches(node, name, |v| v.split_whitespace().any(|w| w == &**value))
            }
            Self::AttrPrefix(name, value) => {
                attr_matches(node, name, |v| !value.is_empty() && v.starts_with(&**value))
            }
            Self::AttrSuffix(name, value) => {
                attr_matches(node, name, |v| !value.is_empty() && v.ends_with(&**value))
            }
            Self::AttrSubstring(name, value) => {
                attr_matches(node, name, |v| !value.is_empty() && v.contains(&**value))
            }
        }
    }
}

fn attr_matches(node: &Node, name: &str, check: impl Fn(&str) -> bool) -> bool {
    node.attribute(name).is_some_and(|v| check(&v))
}

/// Simple selectors that must all match one element.
#[derive(Debug, Clone, Default)]
struct Compound(Vec<SimpleSelector>);

impl Compound {
    fn matches(&self, node: &Node) -> bool {
        node.is_element() && self.0.iter().all(|s| s.matches(node))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

/// Compounds joined by combinators, stored right to left.
#[derive(Debug, Clone)]
struct Complex {
    subject: Compound,
    /// `(combinator to the left of the previous compound, compound)`.
    ancestry: Vec<(Combinator, Compound)>,
}

impl Complex {
    fn matches(&self, node: &Node) -> bool {
        self.subject.matches(node) && self.matches_ancestry(node, 0)
    }

    fn matches_ancestry(&self, node: &Node, depth: usize) -> bool {
        let Some((combinator, compound)) = self.ancestry.get(depth) else {
            return true;
        };
        match combinator {
            Combinator::Child => node
                .parent()
                .is_some_and(|p| compound.matches(&p) && self.matches_ancestry(&p, depth + 1)),
            Combinator::Descendant => node
                .ancestors()
                .any(|a| compound.matches(&a) && self.matches_ancestry(&a, depth + 1)),
        }
    }
}

// ============================================================================
// Selector
// ============================================================================

/// A parsed selector list.
///
/// # Example
///
/// ```ignore
/// let selector = Selector::parse("form > input[type=text], textarea")?;
/// assert!(selector.matches(&node));
/// ```
#[derive(Debug, Clone)]
pub struct Selector {
    text: Box<str>,
    alternatives: Vec<Complex>,
}

impl Selector {
    /// Parses a selector list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSelector`] on empty input, unsupported syntax
    /// or trailing garbage.
    pub fn parse(text: &str) -> Result<Self> {
        let mut parser = Parser {
            text,
            chars: text.chars().peekable(),
        };
        let alternatives = parser.parse_list()?;
        Ok(Self {
            text: text.into(),
            alternatives,
        })
    }

    /// Returns `true` if `node` is an element matching any alternative.
    #[must_use]
    pub fn matches(&self, node: &Node) -> bool {
        self.alternatives.iter().any(|c| c.matches(node))
    }

    /// Returns the original selector text.
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

// ============================================================================
// Parser
// ============================================================================

struct Parser<'a> {
    text: &'a str,
    chars: Peekable<Chars<'a>>,
}

impl Parser<'_> {
    fn error(&self, message: impl Into<String>) -> Error {
        Error::invalid_selector(self.text, message)
    }

    fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {
            skipped = true;
        }
        skipped
    }

    fn parse_list(&mut self) -> Result<Vec<Complex>> {
        let mut alternatives = Vec::new();
        loop {
            self.skip_whitespace();
            alternatives.push(self.parse_complex()?);
            match self.chars.next() {
                None => return Ok(alternatives),
                Some(',') => continue,
                Some(c) => return Err(self.error(format!("unexpected '{c}'"))),
            }
        }
    }

    /// Parses up to (not including) a `,` or the end of input.
    fn parse_complex(&mut self) -> Result<Complex> {
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();
        loop {
            let had_whitespace = self.skip_whitespace();
            match self.chars.peek().copied() {
                None | Some(',') => break,
                Some('>') => {
                    self.chars.next();
                    self.skip_whitespace();
                    combinators.push(Combinator::Child);
                }
                Some(_) if had_whitespace => combinators.push(Combinator::Descendant),
                Some(c) => return Err(self.error(format!("unexpected '{c}'"))),
            }
            compounds.push(self.parse_compound()?);
        }

        let subject = compounds.pop().unwrap_or_default();
        let ancestry = combinators
            .into_iter()
            .rev()
            .zip(compounds.into_iter().rev())
            .collect();
        Ok(Complex { subject, ancestry })
    }

    fn parse_compound(&mut self) -> Result<Compound> {
        let mut parts = Vec::new();
        while let Some(&c) = self.chars.peek() {
            match c {
                '*' => {
                    self.chars.next();
                    parts.push(SimpleSelector::Universal);
                }
                '#' => {
                    self.chars.next();
                    parts.push(SimpleSelector::Id(self.parse_ident()?.into()));
                }
                '.' => {
                    self.chars.next();
                    parts.push(SimpleSelector::Class(self.parse_ident()?.into()));
                }
                '[' => {
                    self.chars.next();
                    parts.push(self.parse_attribute()?);
                }
                ':' => return Err(self.error("pseudo-classes are not supported")),
                c if is_ident_char(c) => {
                    if !parts.is_empty() {
                        return Err(self.error("type selector must come first"));
                    }
                    let tag = self.parse_ident()?.to_ascii_lowercase();
                    parts.push(SimpleSelector::Tag(tag.into()));
                }
                _ => break,
            }
        }
        if parts.is_empty() {
            return Err(self.error("expected a selector"));
        }
        Ok(Compound(parts))
    }

    fn parse_ident(&mut self) -> Result<String> {
        let mut ident = String::new();
        while let Some(c) = self.chars.next_if(|&c| is_ident_char(c)) {
            ident.push(c);
        }
        if ident.is_empty() {
            return Err(self.error("expected an identifier"));
        }
        Ok(ident)
    }

    fn parse_attribute(&mut self) -> Result<SimpleSelector> {
        self.skip_whitespace();
        let name: Box<str> = self.parse_ident()?.into();
        self.skip_whitespace();

        let operator = match self.chars.next() {
            Some(']') => return Ok(SimpleSelector::AttrExists(name)),
            Some('=') => '=',
            Some(op @ ('~' | '^' | '$' | '*')) => {
                if self.chars.next() != Some('=') {
                    return Err(self.error(format!("expected '=' after '{op}'")));
                }
                op
            }
            _ => return Err(self.error("malformed attribute selector")),
        };

        self.skip_whitespace();
        let value: Box<str> = self.parse_attribute_value()?.into();
        self.skip_whitespace();
        if self.chars.next() != Some(']') {
            return Err(self.error("expected ']'"));
        }

        Ok(match operator {
            '~' => SimpleSelector::AttrIncludes(name, value),
            '^' => SimpleSelector::AttrPrefix(name, value),
            '$' => SimpleSelector::AttrSuffix(name, value),
            '*' => SimpleSelector::AttrSubstring(name, value),
            _ => SimpleSelector::AttrEquals(name, value),
        })
    }

    fn parse_attribute_value(&mut self) -> Result<String> {
        let Some(quote) = self.chars.next_if(|&c| c == '"' || c == '\'') else {
            return self.parse_ident();
        };
        let mut value = String::new();
        loop {
            match self.chars.next() {
                Some(c) if c == quote => return Ok(value),
                Some(c) => value.push(c),
                None => return Err(self.error("unterminated string")),
            }
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::dom::Document;

    fn fixture() -> Document {
        let doc = Document::new();
        let form = doc
            .create_element("form")
            .with_attribute("id", "main")
            .with_attribute("class", "review wide");
        let text = doc
            .create_element("input")
            .with_attribute("type", "text")
            .with_attribute("name", "headline-1");
        let check = doc.create_element("input").with_attribute("type", "checkbox");
        let nested = doc.create_element("div");
        let deep = doc.create_element("textarea");
        nested.append_child(&deep).unwrap();
        form.append_child(&text).unwrap();
        form.append_child(&check).unwrap();
        form.append_child(&nested).unwrap();
        doc.body().append_child(&form).unwrap();
        doc
    }

    #[test]
    fn test_type_and_attribute() {
        let doc = fixture();
        assert_eq!(doc.query_selector_all("input").unwrap().len(), 2);
        assert_eq!(doc.query_selector_all("input[type=text]").unwrap().len(), 1);
        assert_eq!(doc.query_selector_all("[name^='headline']").unwrap().len(), 1);
        assert_eq!(doc.query_selector_all("[name$=\"-1\"]").unwrap().len(), 1);
        assert_eq!(doc.query_selector_all("[name*=line]").unwrap().len(), 1);
    }

    #[test]
    fn test_id_and_class() {
        let doc = fixture();
        assert_eq!(doc.query_selector_all("#main").unwrap().len(), 1);
        assert_eq!(doc.query_selector_all("form.review.wide").unwrap().len(), 1);
        assert_eq!(doc.query_selector_all("[class~=wide]").unwrap().len(), 1);
        assert!(doc.query_selector_all(".missing").unwrap().is_empty());
    }

    #[test]
    fn test_combinators() {
        let doc = fixture();
        assert_eq!(doc.query_selector_all("form textarea").unwrap().len(), 1);
        assert!(doc.query_selector_all("form > textarea").unwrap().is_empty());
        assert_eq!(doc.query_selector_all("form > div > textarea").unwrap().len(), 1);
        assert_eq!(doc.query_selector_all("body form>input").unwrap().len(), 2);
    }

    #[test]
    fn test_selector_list_keeps_document_order() {
        let doc = fixture();
        let found = doc.query_selector_all("textarea, input").unwrap();
        let tags: Vec<_> = found.iter().filter_map(|n| n.tag_name()).collect();
        assert_eq!(tags, ["input", "input", "textarea"]);
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse("div >").is_err());
        assert!(Selector::parse("a:hover").is_err());
        assert!(Selector::parse("[name=").is_err());
        assert!(Selector::parse("div, ").is_err());
    }

    #[test]
    fn test_universal_inside_root() {
        let doc = fixture();
        let form = &doc.query_selector_all("form").unwrap()[0];
        assert_eq!(form.query_selector_all("*").unwrap().len(), 4);
    }
}
