//! Integration tests for the `slots` binary.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CONFIG: &str = r#"
[business]
work_start = "09:00"
work_end = "17:00"
lunch_start = "12:00"
lunch_end = "13:00"
timezone = "America/New_York"
"#;

fn slots() -> Command {
    Command::cargo_bin("slots").unwrap()
}

fn workspace() -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("slots.toml");
    fs::write(&config, CONFIG).unwrap();
    let bookings = dir.path().join("bookings.json");
    (dir, config, bookings)
}

#[test]
fn list_prints_one_slot_per_line() {
    let (_dir, config, _) = workspace();
    slots()
        .args(["list", "--date", "2026-03-10", "--duration", "15", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("9:00 AM\n"))
        .stdout(predicate::str::contains("11:45 AM\n1:00 PM\n"))
        .stdout(predicate::str::ends_with("4:45 PM\n"));
}

#[test]
fn list_json_is_an_array_of_strings() {
    let (_dir, config, _) = workspace();
    let output = slots()
        .args(["list", "--date", "2026-03-10", "--duration", "480", "--json", "--config"])
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed, serde_json::json!([]));
}

#[test]
fn list_respects_bookings_file() {
    let (_dir, config, bookings) = workspace();
    // 14:00-14:30 EDT
    fs::write(
        &bookings,
        r#"[{"start": "2026-03-10T18:00:00Z", "end": "2026-03-10T18:30:00Z"}]"#,
    )
    .unwrap();
    slots()
        .args(["list", "--date", "2026-03-10", "--duration", "15", "--config"])
        .arg(&config)
        .arg("--bookings")
        .arg(&bookings)
        .assert()
        .success()
        .stdout(predicate::str::contains("1:45 PM\n2:30 PM\n"))
        .stdout(predicate::str::contains("2:15 PM").not());
}

#[test]
fn list_rejects_non_numeric_duration() {
    let (_dir, config, _) = workspace();
    slots()
        .args(["list", "--date", "2026-03-10", "--duration", "half-hour", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid duration"));
}

#[test]
fn list_rejects_negative_duration() {
    let (_dir, config, _) = workspace();
    slots()
        .args(["list", "--date", "2026-03-10", "--duration", "-15", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid duration"));
}

#[test]
fn list_without_business_table_fails() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("slots.toml");
    fs::write(&config, "[slots]\ngranularity_minutes = 15\n").unwrap();
    slots()
        .args(["list", "--date", "2026-03-10", "--duration", "15", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing business config"));
}

#[test]
fn book_commit_then_conflict() {
    let (_dir, config, bookings) = workspace();

    slots()
        .args(["book", "--date", "2026-03-10", "--slot", "2:15 PM", "--duration", "30"])
        .arg("--config")
        .arg(&config)
        .arg("--bookings")
        .arg(&bookings)
        .arg("--commit")
        .assert()
        .success()
        .stdout(predicate::str::contains("accepted 2:15 PM (14:15)"));

    let stored: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&bookings).unwrap()).unwrap();
    assert_eq!(stored[0]["start"], "2026-03-10T18:15:00Z");

    slots()
        .args(["book", "--date", "2026-03-10", "--slot", "2:30 PM", "--duration", "15"])
        .arg("--config")
        .arg(&config)
        .arg("--bookings")
        .arg(&bookings)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("conflict: overlaps booking"));
}

#[test]
fn book_json_reports_lunch_conflict() {
    let (_dir, config, _) = workspace();
    let output = slots()
        .args(["book", "--date", "2026-03-10", "--slot", "12:15 PM", "--duration", "15", "--json"])
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["status"], "conflict");
    assert_eq!(parsed["conflict"]["reason"], "overlaps_lunch");
}

#[test]
fn book_rejects_doubled_meridiem() {
    let (_dir, config, _) = workspace();
    slots()
        .args(["book", "--date", "2026-03-10", "--slot", "2:15 PM PM", "--duration", "15"])
        .arg("--config")
        .arg(&config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Malformed time string"));
}

#[test]
fn convert_prints_canonical_and_utc() {
    slots()
        .args([
            "convert",
            "--date",
            "2026-03-10",
            "--slot",
            "12:30 AM",
            "--timezone",
            "Asia/Kolkata",
        ])
        .assert()
        .success()
        .stdout("00:30 2026-03-09T19:00:00+00:00\n");
}

#[test]
fn convert_unknown_timezone_fails() {
    slots()
        .args([
            "convert",
            "--date",
            "2026-03-10",
            "--slot",
            "9:00 AM",
            "--timezone",
            "Moon/Base",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown timezone"));
}

#[test]
fn convert_lowercase_requires_flag() {
    let args = [
        "convert",
        "--date",
        "2026-03-10",
        "--slot",
        "9:00 am",
        "--timezone",
        "UTC",
    ];
    slots().args(args).assert().failure();
    slots()
        .args(args)
        .arg("--case-insensitive")
        .assert()
        .success()
        .stdout("09:00 2026-03-10T09:00:00+00:00\n");
}

#[test]
fn list_with_unreadable_bookings_reports_repository_error() {
    let (_dir, config, bookings) = workspace();
    fs::write(&bookings, "[{\"start\": 42}").unwrap();
    slots()
        .args(["list", "--date", "2026-03-10", "--duration", "15", "--config"])
        .arg(&config)
        .arg("--bookings")
        .arg(&bookings)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Repository error"));
}

#[test]
fn list_with_enormous_duration_is_empty() {
    let (_dir, config, _) = workspace();
    slots()
        .args(["list", "--date", "2026-03-10", "--duration", "9223372036854775807"])
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn config_with_uneven_granularity_fails_at_load() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("slots.toml");
    fs::write(&config, format!("{CONFIG}\n[slots]\ngranularity_minutes = 7\n")).unwrap();
    slots()
        .args(["list", "--date", "2026-03-10", "--duration", "15", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid config"));
}
