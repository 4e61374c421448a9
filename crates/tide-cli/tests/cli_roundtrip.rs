//! Drives the `tide` binary against a throwaway database file.

use std::path::Path;
use std::process::Command;

use pretty_assertions::assert_eq;
use serde_json::Value;

fn tide(db: &Path, args: &[&str]) -> (bool, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_tide"))
        .arg("--db")
        .arg(db)
        .args(["--format", "raw"])
        .args(args)
        .env("TIDE_TIMELINE__UTC_OFFSET_MINUTES", "0")
        .env_remove("TIDE_DATABASE__URL")
        .env_remove("TIDE_LOG")
        .output()
        .expect("tide binary runs");
    (
        output.status.success(),
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
    )
}

fn json(stdout: &str) -> Value {
    serde_json::from_str(stdout.trim()).expect("stdout is json")
}

#[test]
fn added_task_shows_up_today_and_completes() {
    let dir = tempfile::TempDir::new().unwrap();
    let db = dir.path().join("tide.db");

    let (ok, stdout, stderr) = tide(&db, &["add", "Water plants", "--due", "today"]);
    assert!(ok, "{stderr}");
    let created = json(&stdout);
    let id = created["id"].as_str().unwrap().to_string();
    assert!(id.starts_with("tsk-"), "{id}");

    let (ok, stdout, stderr) = tide(&db, &["today"]);
    assert!(ok, "{stderr}");
    let today = json(&stdout);
    assert_eq!(today["entries"][0]["id"], id.as_str());
    assert_eq!(today["entries"][0]["is_overdue"], false);

    let (ok, stdout, stderr) = tide(&db, &["done", &id]);
    assert!(ok, "{stderr}");
    assert_eq!(json(&stdout)["status"], "DONE");

    let (ok, _, stderr) = tide(&db, &["cancel", &id]);
    assert!(!ok);
    assert!(stderr.contains("restore it to TODO first"), "{stderr}");
}

#[test]
fn backlog_round_trip() {
    let dir = tempfile::TempDir::new().unwrap();
    let db = dir.path().join("tide.db");

    let (ok, stdout, stderr) = tide(&db, &["add", "Someday", "--due", "+3", "--at", "09:00"]);
    assert!(ok, "{stderr}");
    let id = json(&stdout)["id"].as_str().unwrap().to_string();

    let (ok, stdout, stderr) = tide(&db, &["backlog-move", &id]);
    assert!(ok, "{stderr}");
    let moved = json(&stdout);
    assert_eq!(moved["due_date"], Value::Null);
    assert_eq!(moved["due_time"], Value::Null);

    let (ok, stdout, stderr) = tide(&db, &["backlog"]);
    assert!(ok, "{stderr}");
    assert_eq!(json(&stdout)[0]["id"], id.as_str());

    let (ok, stdout, stderr) = tide(&db, &["delete", &id]);
    assert!(ok, "{stderr}");
    assert_eq!(json(&stdout)["deleted"], true);

    let (ok, stdout, _) = tide(&db, &["backlog"]);
    assert!(ok);
    assert_eq!(json(&stdout), Value::Array(Vec::new()));
}

#[test]
fn unknown_task_is_an_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let db = dir.path().join("tide.db");

    let (ok, _, stderr) = tide(&db, &["done", "tsk-deadbeef"]);
    assert!(!ok);
    assert!(stderr.contains("tide error: task not found: tsk-deadbeef"), "{stderr}");
}

#[test]
fn config_prints_without_opening_the_database() {
    let dir = tempfile::TempDir::new().unwrap();
    let db = dir.path().join("tide.db");

    let (ok, stdout, stderr) = tide(&db, &["config"]);
    assert!(ok, "{stderr}");
    let config = json(&stdout);
    assert_eq!(config["database"]["path"], db.to_str().unwrap());
    assert_eq!(config["timeline"]["utc_offset_minutes"], 0);
    assert!(!db.exists());
}

#[test]
fn complete_load_prints_no_partial_note() {
    let dir = tempfile::TempDir::new().unwrap();
    let db = dir.path().join("tide.db");

    let (ok, _, stderr) = tide(&db, &["week"]);
    assert!(ok, "{stderr}");
    assert!(!stderr.contains("partial results"), "{stderr}");
}
