use chrono::{Local, NaiveDate, NaiveDateTime};

/// Source of "now" for the date functions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Clock {
    /// The local wall clock.
    #[default]
    System,
    /// A pinned moment, for reproducible builds and tests.
    Fixed(NaiveDateTime),
}

impl Clock {
    /// Pins the clock to midnight of `date`.
    pub fn fixed_date(date: NaiveDate) -> Self {
        Clock::Fixed(date.and_time(chrono::NaiveTime::MIN))
    }

    pub fn now(&self) -> NaiveDateTime {
        match self {
            Clock::System => Local::now().naive_local(),
            Clock::Fixed(moment) => *moment,
        }
    }
}

/// Shape of the document handed to the filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputFormat {
    /// A pandoc JSON AST, as piped by `pandoc --filter`.
    #[default]
    PandocJson,
    /// CommonMark/GFM source.
    Markdown,
}

/// Configuration for a filter run.
///
/// ## Examples
///
/// ```
/// use chrono::NaiveDate;
/// use metavars_lib::{InputFormat, MetavarsConfig};
///
/// let config = MetavarsConfig::new()
///     .reference_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
///     .format(InputFormat::Markdown);
/// assert_eq!(config.format, InputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MetavarsConfig {
    /// What the date functions treat as "now"
    pub clock: Clock,
    /// Input document format
    pub format: InputFormat,
}

impl MetavarsConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `clock` as the time source.
    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Pin "now" to midnight of `date`.
    pub fn reference_date(mut self, date: NaiveDate) -> Self {
        self.clock = Clock::fixed_date(date);
        self
    }

    /// Set the input document format.
    pub fn format(mut self, format: InputFormat) -> Self {
        self.format = format;
        self
    }
}
