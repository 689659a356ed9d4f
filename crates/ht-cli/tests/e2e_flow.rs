//! End-to-end tests driving the `ht` binary against a temporary database.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use ht_core::{Entry, STORAGE_KEY};
use ht_db::Database;
use tempfile::TempDir;

fn ht_binary() -> String {
    env!("CARGO_BIN_EXE_ht").to_string()
}

fn db_path(temp: &Path) -> PathBuf {
    temp.join("data").join("ht.db")
}

fn ht_command(temp: &Path) -> Command {
    let mut command = Command::new(ht_binary());
    command
        .env("HOME", temp)
        .env("XDG_CONFIG_HOME", temp.join("config"))
        .env("HT_DATABASE_PATH", db_path(temp))
        .env_remove("RUST_LOG");
    command
}

fn ht(temp: &Path, args: &[&str]) -> Output {
    ht_command(temp)
        .args(args)
        .output()
        .expect("failed to run ht")
}

fn stdout_of(output: &Output) -> String {
    assert!(
        output.status.success(),
        "ht should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn exported(temp: &Path) -> Vec<Entry> {
    let output = ht(temp, &["export", "--stdout"]);
    serde_json::from_str(&stdout_of(&output)).expect("export should be valid JSON")
}

#[test]
fn test_start_nest_stop_and_list() {
    let temp = TempDir::new().unwrap();

    let output = ht(temp.path(), &["start", "Write", "spec", "--at", "10 minutes ago"]);
    assert_eq!(stdout_of(&output), "Started #1 Write spec\n");

    let output = ht(temp.path(), &["start", "Draft outline", "--parent", "1"]);
    assert_eq!(stdout_of(&output), "Started #2 Draft outline (under #1)\n");

    let output = ht(temp.path(), &["stop", "2"]);
    assert!(stdout_of(&output).starts_with("Stopped #2 Draft outline after 00:00:0"));

    let listing = stdout_of(&ht(temp.path(), &["list"]));
    let lines: Vec<&str> = listing.lines().collect();
    assert_eq!(lines.len(), 2, "unexpected listing: {listing}");
    assert!(lines[0].starts_with("#1 Write spec – 00:10:0"));
    assert!(lines[0].contains('⏱'));
    assert!(lines[1].starts_with("  #2 Draft outline – "));
    assert!(!lines[1].contains('⏱'));

    let entries = exported(temp.path());
    assert_eq!(entries.len(), 2);
    let child = entries.iter().find(|e| e.id.get() == 2).unwrap();
    assert_eq!(child.parent_id.map(|id| id.get()), Some(1));
    assert!(!child.running);
    assert!(child.ended_at.is_some());
}

#[test]
fn test_empty_list_message() {
    let temp = TempDir::new().unwrap();
    let output = ht(temp.path(), &["list"]);
    assert_eq!(
        stdout_of(&output),
        "No time entries yet. Start tracking your time!\n"
    );
}

#[test]
fn test_stop_twice_fails() {
    let temp = TempDir::new().unwrap();
    stdout_of(&ht(temp.path(), &["start", "Task"]));
    stdout_of(&ht(temp.path(), &["stop", "1"]));

    let output = ht(temp.path(), &["stop", "1"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("entry already stopped: 1"));
}

#[test]
fn test_start_under_missing_parent_fails() {
    let temp = TempDir::new().unwrap();
    let output = ht(temp.path(), &["start", "Orphan", "--parent", "9"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("entry not found: 9"));
    assert!(exported(temp.path()).is_empty());
}

#[test]
fn test_rename_and_delete_subtree() {
    let temp = TempDir::new().unwrap();
    stdout_of(&ht(temp.path(), &["start", "Parent"]));
    stdout_of(&ht(temp.path(), &["start", "Child", "-p", "1"]));
    stdout_of(&ht(temp.path(), &["start", "Grandchild", "-p", "2"]));
    stdout_of(&ht(temp.path(), &["start", "Sibling"]));

    let output = ht(temp.path(), &["rename", "4", "Other", "task"]);
    assert_eq!(stdout_of(&output), "Renamed #4 to Other task\n");

    let output = ht(temp.path(), &["delete", "1"]);
    assert_eq!(stdout_of(&output), "Deleted #1 and 2 sub-entries\n");

    let entries = exported(temp.path());
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].title, "Other task");

    // Ids are never reused while a higher id is alive.
    let output = ht(temp.path(), &["start", "Next"]);
    assert_eq!(stdout_of(&output), "Started #5 Next\n");
}

#[test]
fn test_deleted_newest_id_is_not_reused() {
    let temp = TempDir::new().unwrap();
    assert_eq!(stdout_of(&ht(temp.path(), &["start", "first"])), "Started #1 first\n");
    assert_eq!(stdout_of(&ht(temp.path(), &["delete", "1"])), "Deleted #1\n");
    assert_eq!(stdout_of(&ht(temp.path(), &["start", "second"])), "Started #2 second\n");

    stdout_of(&ht(temp.path(), &["clear", "--yes"]));
    assert_eq!(stdout_of(&ht(temp.path(), &["start", "third"])), "Started #3 third\n");
}

#[test]
fn test_rename_to_blank_fails() {
    let temp = TempDir::new().unwrap();
    stdout_of(&ht(temp.path(), &["start", "Task"]));

    let output = ht(temp.path(), &["rename", "1", "   "]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("title cannot be empty"));
    assert_eq!(exported(temp.path())[0].title, "Task");
}

fn clear_with_input(temp: &Path, input: &str) -> String {
    let mut child = ht_command(temp)
        .arg("clear")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn ht clear");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    stdout_of(&child.wait_with_output().unwrap())
}

#[test]
fn test_clear_requires_confirmation() {
    let temp = TempDir::new().unwrap();
    stdout_of(&ht(temp.path(), &["start", "One"]));
    stdout_of(&ht(temp.path(), &["start", "Two"]));

    let output = clear_with_input(temp.path(), "n\n");
    assert_eq!(output, "Delete all 2 entries? [y/N] Aborted.\n");
    assert_eq!(exported(temp.path()).len(), 2);

    let output = clear_with_input(temp.path(), "y\n");
    assert_eq!(output, "Delete all 2 entries? [y/N] All entries deleted.\n");
    assert!(exported(temp.path()).is_empty());

    let output = ht(temp.path(), &["clear", "--yes"]);
    assert_eq!(stdout_of(&output), "Nothing to clear.\n");
}

#[test]
fn test_status_shows_running_entry() {
    let temp = TempDir::new().unwrap();
    assert_eq!(stdout_of(&ht(temp.path(), &["status"])), "Time Tracker\n");

    stdout_of(&ht(temp.path(), &["start", "Focus", "--at", "1 hour ago"]));
    let output = stdout_of(&ht(temp.path(), &["status"]));
    assert!(output.starts_with("Focus – 01:00:0"), "unexpected status: {output}");

    let output = ht_command(temp.path())
        .env("HT_DEFAULT_TITLE", "Idle")
        .args(["stop", "1"])
        .output()
        .unwrap();
    stdout_of(&output);
    let output = ht_command(temp.path())
        .env("HT_DEFAULT_TITLE", "Idle")
        .arg("status")
        .output()
        .unwrap();
    assert_eq!(stdout_of(&output), "Idle\n");
}

#[test]
fn test_corrupt_state_starts_empty_and_keeps_backup() {
    let temp = TempDir::new().unwrap();
    let path = db_path(temp.path());
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    Database::open(&path)
        .unwrap()
        .set(STORAGE_KEY, "{not json")
        .unwrap();

    let output = ht(temp.path(), &["list"]);
    assert_eq!(
        stdout_of(&output),
        "No time entries yet. Start tracking your time!\n"
    );

    stdout_of(&ht(temp.path(), &["start", "Fresh"]));
    let db = Database::open(&path).unwrap();
    assert_eq!(
        db.get("timeEntries.corrupt").unwrap().as_deref(),
        Some("{not json")
    );
    let entries = exported(temp.path());
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id.get(), 1);
}

#[test]
fn test_config_file_sets_default_title() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("custom.toml");
    std::fs::write(&config, "default_title = \"Nothing running\"\n").unwrap();

    let output = ht(
        temp.path(),
        &["--config", config.to_str().unwrap(), "status"],
    );
    assert_eq!(stdout_of(&output), "Nothing running\n");
}
