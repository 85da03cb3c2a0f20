//! Built-in placeholder functions.

use crate::config::Clock;
use crate::dates::{parse_date_expression, years_between};
use crate::error::Result;
use crate::registry::FunctionValue;

/// `today()`: the current calendar date as `YYYY-MM-DD`.
pub fn today(clock: &Clock) -> FunctionValue {
    FunctionValue::PlainText(clock.now().date().format("%Y-%m-%d").to_string())
}

/// `yearsSince(date)`: whole years elapsed since `date`, as decimal text.
///
/// ## Errors
///
/// Fails with `InvalidDate` when `date` cannot be parsed.
pub fn years_since(clock: &Clock, date: &str) -> Result<FunctionValue> {
    let now = clock.now();
    let then = parse_date_expression(date, now)?;
    Ok(FunctionValue::PlainText(years_between(then, now).to_string()))
}
