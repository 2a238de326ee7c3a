//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a throwaway data directory and
//! verify outputs.

use chrono::{Duration, SecondsFormat, Utc};
use serde_json::Value;
use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (code, stdout, stderr).
fn run_cli(data_dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_taskminder"))
        .env("TASKMINDER_DATA_DIR", data_dir)
        .env_remove("TASKMINDER_LOG")
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn json(stdout: &str) -> Value {
    serde_json::from_str(stdout).expect("stdout is not JSON")
}

fn due_in(hours: i64) -> String {
    (Utc::now() + Duration::hours(hours)).to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn add(dir: &Path, title: &str, due: &str) -> Value {
    let (code, stdout, stderr) =
        run_cli(dir, &["task", "add", title, "--description", "from test", "--due", due]);
    assert_eq!(code, 0, "task add failed: {stderr}");
    json(&stdout)
}

#[test]
fn test_task_add_schedules_reminders() {
    let dir = tempfile::tempdir().unwrap();

    let out = add(dir.path(), "Pay rent", &due_in(20));

    assert_eq!(out["task"]["status"], "Pending");
    assert_eq!(out["reminderOutcome"], "scheduled");
    let labels: Vec<_> = out["reminders"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["label"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(labels, vec!["10 hours", "1 hour", "10 minutes"]);

    let (code, stdout, _) = run_cli(dir.path(), &["remind", "list"]);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout).as_array().unwrap().len(), 3);
}

#[test]
fn test_task_add_rejects_past_due() {
    let dir = tempfile::tempdir().unwrap();

    let (code, _, stderr) = run_cli(
        dir.path(),
        &["task", "add", "Late", "--description", "x", "--due", &due_in(-1)],
    );

    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_task_add_rejects_malformed_due() {
    let dir = tempfile::tempdir().unwrap();

    let (code, _, stderr) = run_cli(
        dir.path(),
        &["task", "add", "Odd", "--description", "x", "--due", "next tuesday"],
    );

    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_task_list_and_toggle() {
    let dir = tempfile::tempdir().unwrap();
    let id = add(dir.path(), "Call mom", &due_in(5))["task"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let (code, _, _) = run_cli(dir.path(), &["task", "toggle", &id]);
    assert_eq!(code, 0);

    let (code, stdout, _) = run_cli(dir.path(), &["task", "list", "--status", "done"]);
    assert_eq!(code, 0);
    let out = json(&stdout);
    assert_eq!(out["total"], 1);
    assert_eq!(out["tasks"][0]["id"], id.as_str());
    assert_eq!(out["tasks"][0]["checked"], true);
    assert_eq!(out["tasks"][0]["locked"], false);
}

#[test]
fn test_list_reconciles_overdue_tasks() {
    let dir = tempfile::tempdir().unwrap();
    let stale = format!(
        r#"[{{"id":"old","title":"Old","description":"d","dueDate":"{}","status":"Pending"}}]"#,
        due_in(-48)
    );
    std::fs::write(dir.path().join("tasks.json"), stale).unwrap();

    let (code, stdout, _) = run_cli(dir.path(), &["task", "reconcile"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Updated status of 1 of 1 task(s)."));

    let saved = std::fs::read_to_string(dir.path().join("tasks.json")).unwrap();
    assert!(saved.contains("\"Failed\""));

    let (code, _, stderr) = run_cli(dir.path(), &["task", "toggle", "old"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_delete_cancels_reminders() {
    let dir = tempfile::tempdir().unwrap();
    let id = add(dir.path(), "Dentist", &due_in(20))["task"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let (code, _, _) = run_cli(dir.path(), &["task", "delete", &id]);
    assert_eq!(code, 0);

    let (_, stdout, _) = run_cli(dir.path(), &["remind", "list"]);
    assert!(json(&stdout).as_array().unwrap().is_empty());

    let (code, _, _) = run_cli(dir.path(), &["task", "delete", &id]);
    assert_eq!(code, 1);
}

#[test]
fn test_config_set_and_get() {
    let dir = tempfile::tempdir().unwrap();

    let (code, _, _) = run_cli(dir.path(), &["config", "set", "list.page_size", "2"]);
    assert_eq!(code, 0);
    let (code, stdout, _) = run_cli(dir.path(), &["config", "get", "list.page_size"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "2");

    for title in ["a", "b", "c"] {
        add(dir.path(), title, &due_in(30));
    }
    let (_, stdout, _) = run_cli(dir.path(), &["task", "list"]);
    let out = json(&stdout);
    assert_eq!(out["tasks"].as_array().unwrap().len(), 2);
    assert_eq!(out["hasMore"], true);

    let (code, _, _) = run_cli(dir.path(), &["config", "get", "no.such.key"]);
    assert_eq!(code, 1);
}

#[test]
fn test_disabled_reminders_schedule_nothing() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(dir.path(), &["config", "set", "reminders.enabled", "false"]);

    let out = add(dir.path(), "Quiet", &due_in(20));

    assert_eq!(out["reminderOutcome"], "disabled");
    assert!(out["reminders"].as_array().unwrap().is_empty());
}

#[test]
fn test_delete_after_disabling_reminders_clears_outbox() {
    let dir = tempfile::tempdir().unwrap();
    let id = add(dir.path(), "Vet", &due_in(20))["task"]["id"]
        .as_str()
        .unwrap()
        .to_string();
    run_cli(dir.path(), &["config", "set", "reminders.enabled", "false"]);

    let (code, _, _) = run_cli(dir.path(), &["task", "delete", &id]);
    assert_eq!(code, 0);

    let (_, stdout, _) = run_cli(dir.path(), &["remind", "list"]);
    assert!(json(&stdout).as_array().unwrap().is_empty());
}

#[test]
fn test_list_with_huge_page_size_and_pages() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(dir.path(), &["config", "set", "list.page_size", "9223372036854775807"]);
    add(dir.path(), "a", &due_in(30));

    let (code, stdout, stderr) =
        run_cli(dir.path(), &["task", "list", "--pages", "18446744073709551615"]);

    assert_eq!(code, 0, "task list failed: {stderr}");
    let out = json(&stdout);
    assert_eq!(out["tasks"].as_array().unwrap().len(), 1);
    assert_eq!(out["hasMore"], false);
}

#[test]
fn test_unreadable_record_can_be_deleted() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("tasks.json"),
        r#"[{"id":"bad","title":"a","description":"b","dueDate":"someday","status":"Pending"}]"#,
    )
    .unwrap();

    let (code, _, stderr) = run_cli(dir.path(), &["task", "list"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("bad"));

    let (code, _, _) = run_cli(dir.path(), &["task", "delete", "bad"]);
    assert_eq!(code, 0);

    let (code, stdout, _) = run_cli(dir.path(), &["task", "list"]);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout)["total"], 0);
}
