//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against a throwaway home directory so
//! the real `~/.config/keizoku` is never touched.

use std::process::Command;
use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &TempDir, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_keizoku-cli"))
        .args(args)
        .env("HOME", home.path())
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_record_then_status() {
    let home = TempDir::new().unwrap();

    let (stdout, stderr, code) = run_cli(
        &home,
        &["entry", "record", "aiko", "--at", "2024-01-01T09:00:00+09:00"],
    );
    assert_eq!(code, 0, "record failed: {stderr}");
    assert!(stdout.contains("\"started\""), "unexpected output: {stdout}");

    let (stdout, _, code) = run_cli(&home, &["entry", "status", "aiko"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("\"current_streak\": 1"));
    assert!(stdout.contains("\"hotsure_remaining\": 2"));
}

#[test]
fn test_same_day_duplicate_reports_noop() {
    let home = TempDir::new().unwrap();
    let args = &["entry", "record", "aiko", "--at", "2024-01-01T09:00:00+09:00"];

    run_cli(&home, args);
    let (stdout, _, code) = run_cli(&home, args);
    assert_eq!(code, 0);
    assert!(stdout.contains("\"same_day_noop\""));
}

#[test]
fn test_invalid_timestamp_is_rejected() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(&home, &["entry", "record", "aiko", "--at", "yesterday"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("invalid date"));
}

#[test]
fn test_status_for_unknown_user_fails() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(&home, &["entry", "status", "nobody"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("no continuity record"));
}

#[test]
fn test_replenish_status_shows_pool() {
    let home = TempDir::new().unwrap();
    run_cli(
        &home,
        &["entry", "record", "aiko", "--at", "2024-01-01T09:00:00+09:00"],
    );

    // The entry is in a long-past week, so the projected pool is full.
    let (stdout, _, code) = run_cli(&home, &["replenish", "status", "aiko"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("\"week_anchor\""));
    assert!(stdout.contains("\"hotsure_remaining\": 2"));
    assert!(stdout.contains("\"hotsure_used_dates\": []"));

    let (_, stderr, code) = run_cli(&home, &["replenish", "status", "nobody"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("no continuity record"));
}

#[test]
fn test_sweep_on_empty_store() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(&home, &["replenish", "sweep"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("\"examined\": 0"));
}

#[test]
fn test_config_show_defaults() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(&home, &["config", "show"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("max_save_retries = 3"));
}
