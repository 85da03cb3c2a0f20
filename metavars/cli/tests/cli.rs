use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};

const DOC: &str = r#"{"pandoc-api-version":[1,23,1],"meta":{},"blocks":[{"t":"Para","c":[{"t":"Str","c":"Since"},{"t":"Space"},{"t":"Str","c":"{yearsSince(2000-01-01)}"},{"t":"Space"},{"t":"Str","c":"{today()}"}]}]}"#;

// ============================================================================
// Help and Version Tests
// ============================================================================

#[test]
fn test_help_flag() {
    cargo_bin_cmd!("metavars")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("placeholders"))
        .stdout(predicate::str::contains("--today"));
}

#[test]
fn test_version_flag() {
    cargo_bin_cmd!("metavars")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("metavars"));
}

#[test]
fn test_list_functions() {
    cargo_bin_cmd!("metavars")
        .arg("--list-functions")
        .assert()
        .success()
        .stdout("today/0\nyearsSince/1\n");
}

// ============================================================================
// Pandoc JSON filter
// ============================================================================

#[test]
fn test_pandoc_filter_from_stdin() {
    let output = cargo_bin_cmd!("metavars")
        .env_remove("METAVARS_TODAY")
        .args(["html", "--today", "2024-01-01"])
        .write_stdin(DOC)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let document: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(
        document["blocks"][0]["c"],
        json!([
            { "t": "Str", "c": "Since" },
            { "t": "Space" },
            { "t": "Str", "c": "24" },
            { "t": "Space" },
            { "t": "Str", "c": "2024-01-01" },
        ])
    );
}

#[test]
fn test_today_from_environment() {
    cargo_bin_cmd!("metavars")
        .env("METAVARS_TODAY", "2030-01-01")
        .write_stdin(DOC)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""c":"30""#))
        .stdout(predicate::str::contains(r#""c":"2030-01-01""#));
}

#[test]
fn test_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.json");
    std::fs::write(&path, DOC).unwrap();

    cargo_bin_cmd!("metavars")
        .env_remove("METAVARS_TODAY")
        .arg("--input")
        .arg(&path)
        .args(["--today", "2024-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-01-01"));
}

#[test]
fn test_unknown_function_fails_without_output() {
    let doc = DOC.replace("{today()}", "{unknownFn()}");
    cargo_bin_cmd!("metavars")
        .args(["--today", "2024-01-01"])
        .write_stdin(doc)
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("unknownFn"));
}

#[test]
fn test_malformed_call_fails() {
    let doc = DOC.replace("{today()}", "{today}");
    cargo_bin_cmd!("metavars")
        .args(["--today", "2024-01-01"])
        .write_stdin(doc)
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Malformed call"));
}

#[test]
fn test_invalid_json_fails() {
    cargo_bin_cmd!("metavars")
        .write_stdin("not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("JSON error"));
}

#[test]
fn test_bad_today_flag() {
    cargo_bin_cmd!("metavars")
        .args(["--today", "yesterday"])
        .write_stdin(DOC)
        .assert()
        .failure()
        .stderr(predicate::str::contains("YYYY-MM-DD"));
}

// ============================================================================
// Markdown mode
// ============================================================================

#[test]
fn test_markdown_mode() {
    cargo_bin_cmd!("metavars")
        .env_remove("METAVARS_TODAY")
        .args(["--from", "markdown", "--today", "2024-01-01"])
        .write_stdin("Open for {yearsSince(2000-01-01)} years as of {today()}\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Open for 24 years as of 2024-01-01"));
}

#[test]
fn test_verbose_logs_go_to_stderr() {
    cargo_bin_cmd!("metavars")
        .env_remove("RUST_LOG")
        .args(["-vv", "--today", "2024-01-01"])
        .write_stdin(DOC)
        .assert()
        .success()
        .stdout(predicate::str::contains("Interpolated placeholder").not())
        .stderr(predicate::str::contains("Interpolated placeholder"));
}

#[test]
fn test_trace_verbosity_logs_skipped_words() {
    cargo_bin_cmd!("metavars")
        .env_remove("RUST_LOG")
        .args(["-vvv", "--today", "2024-01-01"])
        .write_stdin(DOC)
        .assert()
        .success()
        .stderr(predicate::str::contains("No placeholder"));
}
