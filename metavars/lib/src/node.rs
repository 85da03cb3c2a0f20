//! Inline document nodes and replacement building.
//!
//! The inline model mirrors the pandoc JSON AST (`{"t": .., "c": ..}`) for
//! the node kinds a placeholder function can produce. Inline kinds outside
//! this set still pass through a document untouched; they are simply never
//! materialized as [`Inline`] values.

use serde::{Deserialize, Serialize};

use crate::registry::FunctionValue;

/// Class attached to every rich replacement.
pub const INTERPOLATED_CLASS: &str = "interpolated";

/// Attribute key holding the original placeholder expression.
pub const FIELD_ATTRIBUTE: &str = "field";

/// Node attributes: identifier, classes, and key/value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attr(pub String, pub Vec<String>, pub Vec<(String, String)>);

impl Attr {
    /// Attributes marking a node as interpolated output of `field`.
    pub fn interpolated(field: &str) -> Self {
        Attr(
            String::new(),
            vec![INTERPOLATED_CLASS.to_string()],
            vec![(FIELD_ATTRIBUTE.to_string(), field.to_string())],
        )
    }

    pub fn classes(&self) -> &[String] {
        &self.1
    }

    /// Looks up a key/value attribute.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.2
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// An inline document node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t", content = "c")]
pub enum Inline {
    Str(String),
    Space,
    SoftBreak,
    LineBreak,
    Emph(Vec<Inline>),
    Strong(Vec<Inline>),
    Strikeout(Vec<Inline>),
    Superscript(Vec<Inline>),
    Subscript(Vec<Inline>),
    SmallCaps(Vec<Inline>),
    Code(Attr, String),
    Span(Attr, Vec<Inline>),
}

impl Inline {
    /// Shorthand for a plain text node.
    pub fn text(content: impl Into<String>) -> Self {
        Inline::Str(content.into())
    }

    /// Returns the content of a plain text node.
    ///
    /// Every other node kind returns `None`, which keeps the recognizer from
    /// ever looking inside them.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Inline::Str(text) => Some(text),
            _ => None,
        }
    }

    /// Splits prose into words and spaces, pandoc style.
    ///
    /// Runs of whitespace collapse into a single [`Inline::Space`].
    pub fn words(prose: &str) -> Vec<Inline> {
        let mut out = Vec::new();
        for (i, word) in prose.split_whitespace().enumerate() {
            if i > 0 {
                out.push(Inline::Space);
            }
            out.push(Inline::text(word));
        }
        out
    }
}

/// Turns a function result into the node that replaces a placeholder.
///
/// Plain results become a bare text node. Rich results are wrapped in a
/// span tagged `interpolated` that records the original `field` expression;
/// downstream styling relies on the wrapper existing only for rich content.
pub fn build_replacement(value: FunctionValue, field: &str) -> Inline {
    match value {
        FunctionValue::PlainText(text) => Inline::Str(text),
        FunctionValue::RichContent(inlines) => Inline::Span(Attr::interpolated(field), inlines),
    }
}
