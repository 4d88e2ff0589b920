// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Black-box CLI specs: exit codes and error surfaces.

use assert_cmd::Command;

fn t3270() -> Command {
    Command::cargo_bin("t3270").expect("t3270 binary")
}

#[test]
fn help_exits_zero() {
    t3270().arg("--help").assert().success();
}

#[test]
fn missing_config_flag_is_a_usage_error() {
    t3270().assert().failure();
}

#[test]
fn unreadable_config_file_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    t3270()
        .args(["--config", "/nonexistent/workflow.json"])
        .args(["--log-dir", dir.path().to_str().unwrap()])
        .assert()
        .failure();
}

#[test]
fn invalid_config_exits_nonzero_before_init() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("workflow.json");
    // Empty host fails validation.
    std::fs::write(&config, r#"{"Host": "", "Port": 3270}"#).unwrap();

    t3270()
        .args(["--config", config.to_str().unwrap()])
        .args(["--log-dir", dir.path().join("logs").to_str().unwrap()])
        .assert()
        .failure();
}

#[test]
fn empty_workflow_completes_with_exit_zero() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("workflow.json");
    std::fs::write(&config, r#"{"Host": "127.0.0.1", "Port": 3270}"#).unwrap();

    let assert = t3270()
        .args(["--config", config.to_str().unwrap()])
        .args(["--log-dir", dir.path().join("logs").to_str().unwrap()])
        .args(["--dashboard-dir", dir.path().join("dash").to_str().unwrap()])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("workflows started:   1"));
    assert!(stdout.contains("workflows completed: 1"));
}

#[test]
fn per_pid_log_file_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("workflow.json");
    std::fs::write(&config, r#"{"Host": "127.0.0.1", "Port": 3270}"#).unwrap();
    let log_dir = dir.path().join("logs");

    t3270()
        .args(["--config", config.to_str().unwrap()])
        .args(["--log-dir", log_dir.to_str().unwrap()])
        .args(["--dashboard-dir", dir.path().join("dash").to_str().unwrap()])
        .assert()
        .success();

    let logs: Vec<_> = std::fs::read_dir(&log_dir)
        .unwrap()
        .flatten()
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    assert!(
        logs.iter().any(|n| n.starts_with("logs_") && n.ends_with(".json")),
        "expected a per-PID log file, found {:?}",
        logs
    );
}
