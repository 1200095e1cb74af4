use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn focusbubble(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("focusbubble").unwrap();
    cmd.arg("--home")
        .arg(home.path())
        .env_remove("FOCUSBUBBLE_HOME")
        .env_remove("FOCUSBUBBLE_LOG")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    focusbubble(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("history"))
        .stdout(predicate::str::contains("export"));
}

#[test]
fn test_stats_on_fresh_home() {
    let home = TempDir::new().unwrap();
    focusbubble(&home)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Focus Statistics"))
        .stdout(predicate::str::contains("No completed sessions yet"));

    assert!(home.path().join("focusbubble.db").exists());
}

#[test]
fn test_stats_json() {
    let home = TempDir::new().unwrap();
    let output = focusbubble(&home)
        .args(["--output", "json", "stats"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["statistics"]["totalSessions"], 0);
    assert_eq!(value["statistics"]["averageFocusRate"], 100);
}

#[test]
fn test_clear_requires_force() {
    let home = TempDir::new().unwrap();
    focusbubble(&home)
        .arg("clear")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    focusbubble(&home)
        .args(["clear", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cleared"));
}

#[test]
fn test_show_unknown_session_fails() {
    let home = TempDir::new().unwrap();
    focusbubble(&home)
        .args(["show", "session_0_missing00"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_run_emits_json_events() {
    let home = TempDir::new().unwrap();
    focusbubble(&home)
        .args(["--output", "json", "run", "--ephemeral"])
        .write_stdin("start\ndistract\nstatus\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"topic\":\"session.start\""))
        .stdout(predicate::str::contains("\"topic\":\"distraction.recorded\""))
        .stdout(predicate::str::contains("\"status\": \"running\""));
}

#[test]
fn test_run_rejects_unknown_command_and_continues() {
    let home = TempDir::new().unwrap();
    focusbubble(&home)
        .args(["run", "--ephemeral"])
        .write_stdin("dance\nstart\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Unknown command: dance"))
        .stdout(predicate::str::contains("Session started"));
}

#[test]
fn test_open_session_survives_restart() {
    let home = TempDir::new().unwrap();
    focusbubble(&home)
        .arg("run")
        .write_stdin("start\nquit\n")
        .assert()
        .success();

    let output = focusbubble(&home).arg("export").output().unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let id = report["currentSession"]["id"].as_str().unwrap();
    assert!(id.starts_with("session_"));
    assert_eq!(report["metadata"]["source"], "Focus Bubble - Distraction Tracker");
    assert_eq!(report["sessions"].as_array().map(Vec::len), Some(0));
}

#[test]
fn test_restored_session_can_be_resumed() {
    let home = TempDir::new().unwrap();
    focusbubble(&home)
        .arg("run")
        .write_stdin("start\nquit\n")
        .assert()
        .success();

    focusbubble(&home)
        .args(["--output", "json", "run"])
        .write_stdin("status\nresume\nstatus\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"topic\":\"session.restored\""))
        .stdout(predicate::str::contains("\"status\": \"paused\""))
        .stdout(predicate::str::contains("\"status\": \"running\""));
}

#[test]
fn test_out_of_range_config_is_reported() {
    let home = TempDir::new().unwrap();
    std::fs::write(
        home.path().join("config.yaml"),
        "focus:\n  autosave_interval_secs: 18446744073709551\n",
    )
    .unwrap();

    focusbubble(&home)
        .arg("stats")
        .assert()
        .failure()
        .stderr(predicate::str::contains("autosave_interval_secs"));
}

#[test]
fn test_export_to_file() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("export.json");

    focusbubble(&home)
        .arg("export")
        .arg("--file")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 sessions to"));

    let written = std::fs::read_to_string(&file).unwrap();
    assert!(written.contains("\"insights\""));
}

#[test]
fn test_history_json_empty() {
    let home = TempDir::new().unwrap();
    focusbubble(&home)
        .args(["history", "--output", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"count\": 0"));
}

#[test]
fn test_invalid_config_is_reported() {
    let home = TempDir::new().unwrap();
    std::fs::write(home.path().join("config.yaml"), "focus: [not, a, map]").unwrap();

    focusbubble(&home)
        .arg("stats")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config error"));
}
