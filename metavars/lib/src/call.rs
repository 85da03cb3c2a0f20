//! Call syntax inside a placeholder: `name()` or `name(argument)`.

use crate::error::{MetavarsError, Result};
use crate::registry::Arity;

/// A parsed placeholder expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Call<'a> {
    pub name: &'a str,
    /// Raw argument text; present only for one-argument calls.
    pub argument: Option<&'a str>,
}

impl Call<'_> {
    pub fn arity(&self) -> Arity {
        match self.argument {
            None => Arity::Zero,
            Some(_) => Arity::One,
        }
    }
}

/// Parses a placeholder expression into a call.
///
/// The argument is taken verbatim from between the parentheses. Nested
/// calls are not supported, so an argument may not contain `(` or `)`.
///
/// ## Examples
///
/// ```
/// use metavars_lib::call::parse_call;
///
/// let call = parse_call("today()").unwrap();
/// assert_eq!(call.name, "today");
/// assert_eq!(call.argument, None);
///
/// let call = parse_call("yearsSince(Jan 1 2000)").unwrap();
/// assert_eq!(call.name, "yearsSince");
/// assert_eq!(call.argument, Some("Jan 1 2000"));
/// ```
///
/// ## Errors
///
/// Returns [`MetavarsError::MalformedCall`] when the expression has no
/// trailing `)`, no `(`, more than one `(`, or an empty function name.
pub fn parse_call(expression: &str) -> Result<Call<'_>> {
    let malformed = || MetavarsError::MalformedCall {
        expression: expression.to_string(),
    };

    let call = if let Some(name) = expression.strip_suffix("()") {
        Call {
            name,
            argument: None,
        }
    } else if let Some(body) = expression.strip_suffix(')') {
        let (name, argument) = body.split_once('(').ok_or_else(malformed)?;
        if argument.contains(['(', ')']) {
            return Err(malformed());
        }
        Call {
            name,
            argument: Some(argument),
        }
    } else {
        return Err(malformed());
    };

    if call.name.is_empty() || call.name.contains(['(', ')']) {
        return Err(malformed());
    }
    Ok(call)
}
