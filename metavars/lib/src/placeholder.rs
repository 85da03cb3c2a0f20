//! Placeholder recognition.
//!
//! A text unit is a placeholder only when the whole unit is `{...}`.
//! Braces embedded in longer text (`see {x} here`) are left alone.

use lazy_static::lazy_static;
use regex::Regex;

use crate::node::Inline;

lazy_static! {
    /// Whole-unit `{expression}`; greedy, so the expression runs to the last `}`.
    static ref PLACEHOLDER: Regex = Regex::new(r"(?s)^\{(.*)\}$").unwrap();
}

/// A `{expression}` token found in a single text unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder<'a> {
    /// The full token, braces included.
    pub raw: &'a str,
    /// Everything between the first `{` and the last `}`.
    pub expression: &'a str,
}

/// Recognizes a placeholder in plain text.
///
/// ## Examples
///
/// ```
/// use metavars_lib::placeholder::recognize_text;
///
/// let found = recognize_text("{today()}").unwrap();
/// assert_eq!(found.expression, "today()");
///
/// assert!(recognize_text("on {today()}").is_none());
/// ```
pub fn recognize_text(text: &str) -> Option<Placeholder<'_>> {
    let caps = PLACEHOLDER.captures(text)?;
    let expression = caps.get(1)?.as_str();
    Some(Placeholder {
        raw: text,
        expression,
    })
}

/// Recognizes a placeholder in an inline node; only plain text nodes qualify.
pub fn recognize(inline: &Inline) -> Option<Placeholder<'_>> {
    recognize_text(inline.as_text()?)
}
