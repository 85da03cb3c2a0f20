use crate::registry::Arity;

/// Errors raised while filling placeholders in a document.
///
/// Every variant aborts the whole run: a document is either fully
/// interpolated or not emitted at all.
#[derive(Debug, thiserror::Error)]
pub enum MetavarsError {
    /// No function is registered under this exact name and arity.
    ///
    /// Calling a known name with the wrong number of arguments lands here
    /// too, since the registry is keyed by the pair.
    #[error("Unknown function `{name}` taking {arity}")]
    UnknownFunction { name: String, arity: Arity },

    /// The placeholder body is not `name()` or `name(argument)`.
    #[error("Malformed call `{expression}`: expected `name()` or `name(argument)`")]
    MalformedCall { expression: String },

    /// A date argument could not be understood.
    #[error("Unable to parse date expression `{input}`")]
    InvalidDate { input: String },

    /// The input is not shaped like a document tree.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Markdown could not be written back out.
    #[error("Markdown render error: {0}")]
    Render(String),
}

/// Convenience Result type for metavars operations.
pub type Result<T> = std::result::Result<T, MetavarsError>;
