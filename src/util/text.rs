//! Text helpers: bulleted lists, capitalisation, `/pattern/flags` strings.

// ============================================================================
// Imports
// ============================================================================

use std::fmt::Display;

use regex::{Regex, RegexBuilder};
use tracing::debug;

// ============================================================================
// Constants
// ============================================================================

/// Indentation of bulleted list items.
const BULLET_INDENT: usize = 4;

// ============================================================================
// Lists
// ============================================================================

/// Renders items as an indented bulleted list, each on its own line.
///
/// Returns an empty string for no items.
///
/// ```ignore
/// assert_eq!(bulleted_list(["One", "Two"]), "\n    * One\n    * Two");
/// ```
#[must_use]
pub fn bulleted_list<I>(items: I) -> String
where
    I: IntoIterator,
    I::Item: Display,
{
    let bullet = format!("\n{}* ", " ".repeat(BULLET_INDENT));
    items
        .into_iter()
        .map(|item| format!("{bullet}{item}"))
        .collect()
}

// ============================================================================
// Capitalisation
// ============================================================================

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Uppercases the first character.
#[must_use]
pub fn first_letter(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Uppercases the first character of every ASCII word.
#[must_use]
pub fn each_word(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if is_word_char(c) && !in_word {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        in_word = is_word_char(c);
    }
    out
}

/// Lowercases, capitalises each word and removes all whitespace.
///
/// `"main headline"` becomes `"MainHeadline"`.
#[must_use]
pub fn camel_case(text: &str) -> String {
    each_word(&text.to_lowercase())
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

// ============================================================================
// Regex Strings
// ============================================================================

/// Builds a regex from its `/pattern/flags` form.
///
/// The `i` and `m` flags are honoured; `g`, `u` and `y` are accepted and
/// ignored. Returns `None` for strings without two slashes around a
/// non-empty pattern, or for patterns that do not compile.
#[must_use]
pub fn to_regex(text: &str) -> Option<Regex> {
    let start = text.find('/')?;
    let end = text.rfind('/')?;
    if end <= start + 1 {
        debug!(text, "Cannot make regex: no /pattern/");
        return None;
    }
    let pattern = &text[start + 1..end];
    let flags: String = text[end + 1..]
        .chars()
        .take_while(|c| "gimuy".contains(*c))
        .collect();

    RegexBuilder::new(pattern)
        .case_insensitive(flags.contains('i'))
        .multi_line(flags.contains('m'))
        .build()
        .inspect_err(|e| debug!(text, error = %e, "Cannot make regex"))
        .ok()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulleted_list() {
        assert_eq!(bulleted_list([1, 2, 3]), "\n    * 1\n    * 2\n    * 3");
        assert_eq!(bulleted_list(Vec::<String>::new()), "");
    }

    #[test]
    fn test_first_letter() {
        assert_eq!(first_letter("abc abc"), "Abc abc");
        assert_eq!(first_letter("1 number"), "1 number");
        assert_eq!(first_letter(""), "");
    }

    #[test]
    fn test_each_word() {
        assert_eq!(each_word("abc abc"), "Abc Abc");
        assert_eq!(each_word("お問い合わせ"), "お問い合わせ");
        assert_eq!(each_word("main_headline two"), "Main_headline Two");
    }

    #[test]
    fn test_camel_case_removes_all_whitespace() {
        assert_eq!(camel_case("main HEADLINE text"), "MainHeadlineText");
        assert_eq!(camel_case("Unnamed"), "Unnamed");
    }

    #[test]
    fn test_to_regex() {
        let re = to_regex("/abc/gi").unwrap();
        assert!(re.is_match("xABCx"));

        let re = to_regex("/^a+/").unwrap();
        assert!(!re.is_match("BAA"));
    }

    #[test]
    fn test_to_regex_malformed() {
        assert!(to_regex("abc/gi").is_none());
        assert!(to_regex("//").is_none());
        assert!(to_regex("/(/").is_none());
    }
}
