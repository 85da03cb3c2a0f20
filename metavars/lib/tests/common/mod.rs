//! Common test utilities for metavars integration tests.

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use metavars_lib::Clock;

/// Loads a fixture from the `tests/fixtures/` directory.
///
/// ## Panics
///
/// Panics if the fixture file cannot be read or does not exist.
pub fn load_fixture(path: &str) -> String {
    let mut fixture_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    fixture_path.push("tests");
    fixture_path.push("fixtures");
    fixture_path.push(path);

    fs::read_to_string(&fixture_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read fixture at {:?}: {}",
            fixture_path.display(),
            e
        )
    })
}

/// A clock pinned to midnight on the given day.
pub fn clock_at(year: i32, month: u32, day: u32) -> Clock {
    Clock::fixed_date(NaiveDate::from_ymd_opt(year, month, day).unwrap())
}
