//! Computed placeholders for prose documents.
//!
//! Authors write `{name()}` or `{name(argument)}` as a standalone word in a
//! document; the filter evaluates it against a fixed [`Registry`] and puts
//! the result in its place. Two functions ship built in:
//!
//! - `today()` - the current date as `YYYY-MM-DD`
//! - `yearsSince(date)` - whole years elapsed since `date`
//!
//! Plain results replace the placeholder with text. Rich results are
//! wrapped in a span with class `interpolated` and a `field` attribute
//! holding the original expression.
//!
//! ## Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use metavars_lib::{InputFormat, MetavarsConfig, run};
//!
//! let config = MetavarsConfig::new()
//!     .reference_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
//!     .format(InputFormat::Markdown);
//!
//! let output = run("We have been open {yearsSince(2000-01-01)} years.", &config).unwrap();
//! assert!(output.contains("We have been open 24 years."));
//! ```

pub mod call;
pub mod config;
pub mod dates;
pub mod error;
pub mod evaluate;
pub mod filter;
pub mod functions;
pub mod markdown;
pub mod node;
pub mod pandoc;
pub mod placeholder;
pub mod registry;

pub use call::{Call, parse_call};
pub use config::{Clock, InputFormat, MetavarsConfig};
pub use error::{MetavarsError, Result};
pub use evaluate::evaluate;
pub use filter::Filter;
pub use node::{Attr, Inline, build_replacement};
pub use placeholder::{Placeholder, recognize};
pub use registry::{Arity, Function, FunctionValue, Registry, RegistryBuilder};

/// Filters a whole document with the built-in functions.
///
/// The output is only produced when every placeholder evaluated; the first
/// failure is returned and nothing else.
pub fn run(input: &str, config: &MetavarsConfig) -> Result<String> {
    let registry = Registry::builtin(config.clock.clone());
    run_with_registry(input, config.format, &registry)
}

/// Filters a whole document against a caller-supplied registry.
pub fn run_with_registry(input: &str, format: InputFormat, registry: &Registry) -> Result<String> {
    let filter = Filter::new(registry);
    match format {
        InputFormat::PandocJson => pandoc::filter_json(input, &filter),
        InputFormat::Markdown => markdown::filter_markdown(input, &filter),
    }
}
