//! Date expression parsing and calendar arithmetic.
//!
//! Accepts the forms authors actually type into prose: ISO dates, US and
//! European numeric dates, month names, partial dates, and a handful of
//! relative phrases (`yesterday`, `3 years ago`, `in 2 weeks`). Missing
//! parts of a partial date are filled in from `now`.

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{MetavarsError, Result};

lazy_static! {
    /// `3 years ago`, `a month ago`
    static ref RELATIVE_PAST: Regex = Regex::new(
        r"^(\d+|an?|one)\s+(second|minute|hour|day|week|month|year)s?\s+ago$"
    ).unwrap();

    /// `in 2 weeks`, `in a year`
    static ref RELATIVE_FUTURE: Regex = Regex::new(
        r"^in\s+(\d+|an?|one)\s+(second|minute|hour|day|week|month|year)s?$"
    ).unwrap();

    /// Ordinal day suffixes: `1st`, `22nd`, `3rd`, `5th`
    static ref ORDINAL: Regex = Regex::new(r"\b(\d{1,2})(?:st|nd|rd|th)\b").unwrap();

    static ref YEAR_ONLY: Regex = Regex::new(r"^(\d{4})$").unwrap();

    static ref YEAR_MONTH: Regex = Regex::new(r"^(\d{4})[-/](\d{1,2})$").unwrap();
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%B %d %Y",
    "%d %B %Y",
];

#[derive(Debug, Clone, Copy)]
enum Unit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl Unit {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "second" => Some(Unit::Second),
            "minute" => Some(Unit::Minute),
            "hour" => Some(Unit::Hour),
            "day" => Some(Unit::Day),
            "week" => Some(Unit::Week),
            "month" => Some(Unit::Month),
            "year" => Some(Unit::Year),
            _ => None,
        }
    }
}

/// Parses a date expression relative to `now`.
///
/// ## Examples
///
/// ```
/// use chrono::NaiveDate;
/// use metavars_lib::dates::parse_date_expression;
///
/// let now = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap().and_hms_opt(12, 0, 0).unwrap();
///
/// let date = parse_date_expression("March 3rd, 2001", now).unwrap();
/// assert_eq!(date.date(), NaiveDate::from_ymd_opt(2001, 3, 3).unwrap());
///
/// let date = parse_date_expression("2 years ago", now).unwrap();
/// assert_eq!(date.date(), NaiveDate::from_ymd_opt(2022, 6, 15).unwrap());
/// ```
///
/// ## Errors
///
/// Returns [`MetavarsError::InvalidDate`] when no known form matches.
pub fn parse_date_expression(input: &str, now: NaiveDateTime) -> Result<NaiveDateTime> {
    let invalid = || MetavarsError::InvalidDate {
        input: input.to_string(),
    };

    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(invalid());
    }

    if let Ok(moment) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(moment.naive_local());
    }
    if let Ok(moment) = DateTime::parse_from_rfc2822(trimmed) {
        return Ok(moment.naive_local());
    }
    for format in DATETIME_FORMATS {
        if let Ok(moment) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(moment);
        }
    }

    let normalized = normalize(trimmed);

    match normalized.as_str() {
        "now" | "today" => return Ok(now),
        "yesterday" => return now.checked_sub_signed(TimeDelta::days(1)).ok_or_else(invalid),
        "tomorrow" => return now.checked_add_signed(TimeDelta::days(1)).ok_or_else(invalid),
        _ => {}
    }

    if let Some(caps) = RELATIVE_PAST.captures(&normalized) {
        return shift(now, &caps[1], &caps[2], false).ok_or_else(invalid);
    }
    if let Some(caps) = RELATIVE_FUTURE.captures(&normalized) {
        return shift(now, &caps[1], &caps[2], true).ok_or_else(invalid);
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&normalized, format) {
            return Ok(date.and_time(NaiveTime::MIN));
        }
    }

    partial_date(&normalized, now)
        .map(|date| date.and_time(NaiveTime::MIN))
        .ok_or_else(invalid)
}

/// Whole calendar years from `then` to `now`.
///
/// A year is complete once `then` shifted forward by twelve months (day
/// clamped to the month's length) is not after `now`, so Feb 29 reaches
/// its anniversary on Feb 28 in common years. Negative when `then` lies in
/// the future, truncated toward zero.
pub fn years_between(then: NaiveDateTime, now: NaiveDateTime) -> i64 {
    let mut months = i64::from(now.year() - then.year()) * 12 + i64::from(now.month())
        - i64::from(then.month());

    if then <= now {
        while months > 0 && shift_months(then, months).is_none_or(|moment| moment > now) {
            months -= 1;
        }
    } else {
        while months < 0 && shift_months(then, months).is_none_or(|moment| moment < now) {
            months += 1;
        }
    }
    months / 12
}

fn shift_months(moment: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    let count = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        moment.checked_add_months(count)
    } else {
        moment.checked_sub_months(count)
    }
}

/// Lowercases, strips ordinal suffixes and commas, and collapses whitespace.
fn normalize(input: &str) -> String {
    let lowered = input.to_lowercase().replace(',', " ");
    let stripped = ORDINAL.replace_all(&lowered, "$1");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn shift(now: NaiveDateTime, amount: &str, unit: &str, forward: bool) -> Option<NaiveDateTime> {
    let amount: u32 = match amount {
        "a" | "an" | "one" => 1,
        digits => digits.parse().ok()?,
    };
    let unit = Unit::parse(unit)?;

    let delta = match unit {
        Unit::Month | Unit::Year => {
            let months = match unit {
                Unit::Year => Months::new(amount.checked_mul(12)?),
                _ => Months::new(amount),
            };
            return if forward {
                now.checked_add_months(months)
            } else {
                now.checked_sub_months(months)
            };
        }
        Unit::Second => TimeDelta::try_seconds(i64::from(amount))?,
        Unit::Minute => TimeDelta::try_minutes(i64::from(amount))?,
        Unit::Hour => TimeDelta::try_hours(i64::from(amount))?,
        Unit::Day => TimeDelta::try_days(i64::from(amount))?,
        Unit::Week => TimeDelta::try_weeks(i64::from(amount))?,
    };

    if forward {
        now.checked_add_signed(delta)
    } else {
        now.checked_sub_signed(delta)
    }
}

/// Year-only and year-month forms, completed from `now`.
fn partial_date(normalized: &str, now: NaiveDateTime) -> Option<NaiveDate> {
    if let Some(caps) = YEAR_ONLY.captures(normalized) {
        let year = caps[1].parse().ok()?;
        return clamped(year, now.month(), now.day());
    }
    if let Some(caps) = YEAR_MONTH.captures(normalized) {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        return clamped(year, month, now.day());
    }

    // `january 2000`, `jan 2000`
    let first = NaiveDate::parse_from_str(&format!("1 {normalized}"), "%d %B %Y").ok()?;
    clamped(first.year(), first.month(), now.day())
}

/// Builds a date, pulling `day` back to the month's last day if needed.
fn clamped(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    (1..=day)
        .rev()
        .find_map(|d| NaiveDate::from_ymd_opt(year, month, d))
}
