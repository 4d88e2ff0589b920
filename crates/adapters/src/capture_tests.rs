// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{append_screen, initialize_output};

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn api_mode_truncates_and_appends_raw() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.txt");

    std::fs::write(&path, "stale").unwrap();
    initialize_output(&path, true).unwrap();
    append_screen(&path, true, &lines(&["ROW ONE", "ROW TWO"])).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content, "ROW ONE\nROW TWO\n");
}

#[test]
fn html_mode_writes_preamble_and_wraps_screens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.html");

    initialize_output(&path, false).unwrap();
    append_screen(&path, false, &lines(&["WELCOME"])).unwrap();
    append_screen(&path, false, &lines(&["SIGNON"])).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("<!DOCTYPE html>"));
    assert_eq!(content.matches("<pre>").count(), 2);
    assert!(content.contains("WELCOME\n"));
    assert!(content.contains("SIGNON\n"));
}

#[test]
fn html_mode_appends_to_an_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.html");

    std::fs::write(&path, "existing\n").unwrap();
    initialize_output(&path, false).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("existing\n"));
}

#[test]
fn missing_parent_directories_are_created() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("captures/run1/out.txt");
    initialize_output(&path, true).unwrap();
    assert!(path.exists());
}
