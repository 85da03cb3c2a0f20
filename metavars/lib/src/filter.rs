//! The per-node entry point a host traversal calls.

use crate::call::parse_call;
use crate::error::Result;
use crate::evaluate::evaluate;
use crate::node::{build_replacement, Inline};
use crate::placeholder::recognize;
use crate::registry::{FunctionValue, Registry};

/// Maps one inline node to its replacement.
///
/// Holds nothing but a shared registry, so a filter can be called any
/// number of times in any order without affecting later calls.
#[derive(Debug, Clone, Copy)]
pub struct Filter<'r> {
    registry: &'r Registry,
}

impl<'r> Filter<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Filters a single inline node.
    ///
    /// Returns `Ok(None)` when the node is not a placeholder and should be
    /// kept as is, or `Ok(Some(replacement))` otherwise.
    ///
    /// ## Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use metavars_lib::{Clock, Filter, Inline, Registry};
    ///
    /// let registry = Registry::builtin(Clock::fixed_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
    /// let filter = Filter::new(&registry);
    ///
    /// assert_eq!(filter.apply(&Inline::text("{today()}")).unwrap(), Some(Inline::text("2024-01-01")));
    /// assert_eq!(filter.apply(&Inline::text("hello")).unwrap(), None);
    /// ```
    ///
    /// ## Errors
    ///
    /// `MalformedCall`, `UnknownFunction`, or whatever the called function
    /// fails with. Callers are expected to abort the whole document.
    pub fn apply(&self, inline: &Inline) -> Result<Option<Inline>> {
        let Some(placeholder) = recognize(inline) else {
            return Ok(None);
        };

        let call = parse_call(placeholder.expression)?;
        let value = evaluate(self.registry, &call)?;

        let kind = match &value {
            FunctionValue::PlainText(_) => "plain",
            FunctionValue::RichContent(_) => "rich",
        };
        tracing::debug!(field = placeholder.expression, kind, "Interpolated placeholder");

        Ok(Some(build_replacement(value, placeholder.expression)))
    }
}
