//! Integration tests for the `courtwatch` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to exercise the resolve and
//! requests subcommands through the actual binary, including stdin piping,
//! config overrides and the on-disk request store.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper: path to the initialize.json fixture.
fn payload_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/initialize.json")
}

fn payload() -> String {
    std::fs::read_to_string(payload_path()).expect("initialize.json fixture must exist")
}

fn courtwatch() -> Command {
    let mut cmd = Command::cargo_bin("courtwatch").unwrap();
    cmd.env_remove("COURTWATCH_CONFIG").env_remove("RUST_LOG");
    cmd
}

// ─────────────────────────────────────────────────────────────────────────────
// resolve
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn resolve_json_from_file() {
    let output = courtwatch()
        .args(["resolve", "-i", payload_path()])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["surface"], "Грунт");
    assert_eq!(value["dropped"], 2);

    let results = value["results"].as_array().unwrap();
    let numbers: Vec<u64> = results
        .iter()
        .map(|r| r["court"]["number"].as_u64().unwrap())
        .collect();
    assert_eq!(numbers, vec![4, 5, 6, 13]);
    assert_eq!(results[1]["best_available_window"]["start"]["hours"], 22);
    assert_eq!(results[1]["best_available_window"]["start"]["minutes"], 30);
    assert_eq!(results[1]["all_available_windows"].as_array().unwrap().len(), 3);
    assert_eq!(value["rejected"].as_array().unwrap().len(), 1);
}

#[test]
fn resolve_text_from_stdin() {
    courtwatch()
        .args(["resolve", "--format", "text"])
        .write_stdin(payload())
        .assert()
        .success()
        .stdout(predicate::str::contains("Free courts (Грунт, 22:00-00:00): 4"))
        .stdout(predicate::str::contains("Дутик № 2"))
        .stdout(predicate::str::contains("Court #6 - 23:30-00:00 (30 min)"))
        .stdout(predicate::str::contains("Court #7").not());
}

#[test]
fn resolve_other_surface() {
    courtwatch()
        .args(["resolve", "-i", payload_path(), "--surface", "Хард", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Court #2 - 22:00-00:00 (2 h)"))
        .stdout(predicate::str::contains("Court #1 ").not());
}

#[test]
fn resolve_unknown_surface_fails() {
    courtwatch()
        .args(["resolve", "-i", payload_path(), "--surface", "Трава"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("court catalog is empty"));
}

#[test]
fn resolve_misaligned_window_fails() {
    courtwatch()
        .args(["resolve", "-i", payload_path(), "--from", "22:30", "--cell-minutes", "60"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not divide"));
}

#[test]
fn resolve_invalid_json_fails() {
    courtwatch()
        .arg("resolve")
        .write_stdin("var initial = {")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read initialize payload"));
}

#[test]
fn resolve_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("free.txt");

    courtwatch()
        .args(["resolve", "-i", payload_path(), "--format", "text", "-o"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.contains("Court #4 - 22:00-00:00 (2 h)"));
}

#[test]
fn config_file_sets_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("courtwatch.json");
    std::fs::write(
        &config,
        r#"{"surface": "Хард", "halls": [{"name": "Центральный", "courts": [2]}]}"#,
    )
    .unwrap();

    courtwatch()
        .args(["resolve", "-i", payload_path(), "--format", "text", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Центральный"))
        .stdout(predicate::str::contains("Court #2"));
}

#[test]
fn missing_config_file_fails() {
    courtwatch()
        .args(["resolve", "-i", payload_path(), "--config", "/nonexistent/courtwatch.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));
}

// ─────────────────────────────────────────────────────────────────────────────
// requests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn requests_add_list_check() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("booking_requests.json");
    let store = store.to_str().unwrap();

    courtwatch()
        .args(["requests", "--store", store, "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No booking requests"));

    courtwatch()
        .args(["requests", "--store", store, "add", "--date", "2025-09-22", "--from", "22:00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added #1 2025-09-22 22:00-00:00 pending"));

    courtwatch()
        .args(["requests", "--store", store, "check", "--id", "1", "-i", payload_path()])
        .assert()
        .success()
        .stdout(predicate::str::contains("court #4 offers 22:00-00:00"))
        .stdout(predicate::str::contains("attempts=1"));

    courtwatch()
        .args(["requests", "--store", store, "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#1 2025-09-22 22:00-00:00 pending attempts=1"));
}

/// Helper: a fresh store under `dir` holding one request.
fn store_with_request(dir: &std::path::Path, from: &str, duration: &str) -> std::path::PathBuf {
    let store = dir.join("booking_requests.json");
    courtwatch()
        .args(["requests", "--store"])
        .arg(&store)
        .args(["add", "--date", "2025-09-24", "--from", from, "--duration", duration])
        .assert()
        .success();
    store
}

#[test]
fn requests_check_unopened_date_waits() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_with_request(dir.path(), "22:00", "120");

    courtwatch()
        .args(["requests", "--store"])
        .arg(&store)
        .args(["check", "--id", "1"])
        .write_stdin(r#"{"instructions":{"set":{"court_types":[],"time_blocked":[]}}}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("waiting attempts=1"))
        .stdout(predicate::str::contains("no free courts on 2025-09-24 yet"));

    let saved = std::fs::read_to_string(&store).unwrap();
    assert!(saved.contains(r#""status": "waiting""#));
    assert!(saved.contains(r#""attempts": 1"#));
}

#[test]
fn requests_check_resolves_the_request_window() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_with_request(dir.path(), "20:00", "60");

    courtwatch()
        .args(["requests", "--store"])
        .arg(&store)
        .args(["check", "--id", "1", "-i", payload_path()])
        .assert()
        .success()
        .stdout(predicate::str::contains("#1 2025-09-24 20:00-21:00 pending attempts=1"))
        .stdout(predicate::str::contains("court #4 offers 20:00-21:00"));
}

#[test]
fn requests_check_without_matching_court_fails() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_with_request(dir.path(), "22:00", "60");
    let payload = r#"{"instructions":{"set":{
        "court_types":[{"name":"Грунт","courts":[{"id":104,"number":4}]}],
        "time_blocked":[{"court_id":104,"time_from":"22:00","time_to":"22:30"}]
    }}}"#;

    courtwatch()
        .args(["requests", "--store"])
        .arg(&store)
        .args(["check", "--id", "1"])
        .write_stdin(payload)
        .assert()
        .success()
        .stdout(predicate::str::contains("failed attempts=1"))
        .stdout(predicate::str::contains("no court offers 22:00-23:00"));

    let saved = std::fs::read_to_string(&store).unwrap();
    assert!(saved.contains(r#""status": "failed""#));
}

#[test]
fn requests_check_with_explicit_window_uses_suffix_windows() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_with_request(dir.path(), "22:00", "30");

    // Every window of 22:00-00:00 ends at midnight, so 22:00-22:30 never matches.
    courtwatch()
        .args(["requests", "--store"])
        .arg(&store)
        .args(["check", "--id", "1", "-i", payload_path(), "--from", "22:00", "--to", "00:00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("failed attempts=1"))
        .stdout(predicate::str::contains("no court offers 22:00-22:30"));
}

#[test]
fn requests_add_rejects_window_past_midnight() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("booking_requests.json");

    courtwatch()
        .args(["requests", "--store"])
        .arg(&store)
        .args(["add", "--date", "2025-09-22", "--from", "23:00", "--duration", "120"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("runs past midnight"));

    assert!(!store.exists());
}

#[test]
fn requests_check_unknown_id_fails() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("booking_requests.json");

    courtwatch()
        .args(["requests", "--store"])
        .arg(&store)
        .args(["check", "--id", "7", "-i", payload_path()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No booking request #7"));
}
