// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use super::execute_step;
use crate::error::StepError;
use crate::run::{RunContext, RunOptions};
use t3270_adapters::{FakeTerminal, TerminalCall};
use t3270_core::{AidKey, Configuration, Step, StepKind};

fn config() -> Configuration {
    Configuration {
        host: "127.0.0.1".to_string(),
        port: 3270,
        steps: Vec::new(),
        output_file_path: None,
        wait_for_field: true,
        token: None,
        ramp_up_batch_size: 10,
        ramp_up_delay: 1.0,
        input_file_path: None,
    }
}

fn ctx() -> RunContext {
    RunContext::new(RunOptions::default(), None)
}

async fn run(terminal: &FakeTerminal, step: Step, config: &Configuration) -> Result<(), StepError> {
    let ctx = ctx();
    execute_step(terminal, &step, config, &ctx, Path::new("/tmp/unused.out")).await
}

#[tokio::test]
async fn connect_maps_to_adapter_connect() {
    let terminal = FakeTerminal::new();
    run(&terminal, Step::new(StepKind::Connect), &config())
        .await
        .unwrap();
    assert_eq!(terminal.calls(), vec![TerminalCall::Connect]);
}

#[tokio::test]
async fn connect_failure_is_a_connect_error() {
    let terminal = FakeTerminal::new();
    terminal.set_connect_fails(true);
    let err = run(&terminal, Step::new(StepKind::Connect), &config())
        .await
        .err()
        .unwrap();
    assert!(err.is_connect_failure());
}

#[tokio::test]
async fn addressed_fill_string_uses_coordinates() {
    let terminal = FakeTerminal::new();
    run(
        &terminal,
        Step::at(StepKind::FillString, 10, 44, "user1"),
        &config(),
    )
    .await
    .unwrap();
    assert_eq!(
        terminal.calls(),
        vec![TerminalCall::FillString {
            row: 10,
            column: 44,
            text: "user1".to_string(),
        }]
    );
}

#[tokio::test]
async fn cursor_fill_string_types_in_place() {
    let terminal = FakeTerminal::new();
    run(
        &terminal,
        Step::at(StepKind::FillString, 0, 0, "inline"),
        &config(),
    )
    .await
    .unwrap();
    assert_eq!(
        terminal.calls(),
        vec![TerminalCall::SetString {
            text: "inline".to_string(),
        }]
    );
}

#[tokio::test]
async fn check_value_compares_trimmed_text() {
    let terminal = FakeTerminal::new();
    terminal.set_screen_value(1, 2, "EXPECTED   ");
    let mut step = Step::at(StepKind::CheckValue, 1, 2, "EXPECTED");
    step.coordinates.length = 11;
    run(&terminal, step, &config()).await.unwrap();
}

#[tokio::test]
async fn check_value_mismatch_carries_the_exact_message() {
    let terminal = FakeTerminal::new();
    terminal.set_screen_value(1, 2, "ACTUAL    ");
    let mut step = Step::at(StepKind::CheckValue, 1, 2, "EXPECTED");
    step.coordinates.length = 11;

    let err = run(&terminal, step, &config()).await.err().unwrap();
    assert_eq!(
        err.to_string(),
        "CheckValue failed. Expected: EXPECTED, Found: ACTUAL"
    );
}

#[tokio::test]
async fn key_press_steps_send_their_key() {
    let terminal = FakeTerminal::new();
    run(&terminal, Step::new(StepKind::PressEnter), &config())
        .await
        .unwrap();
    run(&terminal, Step::new(StepKind::PressPf(7)), &config())
        .await
        .unwrap();
    assert_eq!(
        terminal.calls(),
        vec![
            TerminalCall::Press { key: AidKey::Enter },
            TerminalCall::Press { key: AidKey::Pf(7) },
        ]
    );
}

#[tokio::test]
async fn disconnect_never_fails() {
    let terminal = FakeTerminal::new();
    run(&terminal, Step::new(StepKind::Disconnect), &config())
        .await
        .unwrap();
}

#[tokio::test]
async fn screen_grab_appends_to_the_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.txt");
    let terminal = FakeTerminal::new();
    terminal.set_screen_lines(vec!["SCREEN ONE".to_string()]);

    let options = RunOptions {
        api_mode: true,
        ..RunOptions::default()
    };
    let ctx = RunContext::new(options, None);
    let step = Step::new(StepKind::AsciiScreenGrab);
    execute_step(&terminal, &step, &config(), &ctx, &path)
        .await
        .unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "SCREEN ONE\n");
}

#[tokio::test]
async fn initialize_output_prepares_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.html");
    let terminal = FakeTerminal::new();

    let ctx = ctx();
    let step = Step::new(StepKind::InitializeOutput);
    execute_step(&terminal, &step, &config(), &ctx, &path)
        .await
        .unwrap();

    assert!(std::fs::read_to_string(&path)
        .unwrap()
        .starts_with("<!DOCTYPE html>"));
}

#[tokio::test]
async fn token_is_substituted_before_the_adapter_call() {
    let terminal = FakeTerminal::new();
    let mut config = config();
    config.token = Some("s3cret".to_string());

    run(
        &terminal,
        Step::at(StepKind::FillString, 5, 5, "pw={{token}}"),
        &config,
    )
    .await
    .unwrap();

    assert_eq!(
        terminal.calls(),
        vec![TerminalCall::FillString {
            row: 5,
            column: 5,
            text: "pw=s3cret".to_string(),
        }]
    );
}

#[tokio::test]
async fn missing_token_leaves_the_placeholder_and_warns_once() {
    let terminal = FakeTerminal::new();
    let config = config();
    let ctx = ctx();

    for _ in 0..3 {
        let step = Step::at(StepKind::FillString, 5, 5, "{{token}}");
        execute_step(&terminal, &step, &config, &ctx, Path::new("/tmp/unused.out"))
            .await
            .unwrap();
    }

    // The once-guard is consumed by the first substitution attempt.
    assert!(!ctx.warn_token_once());
    let calls = terminal.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().all(|c| matches!(
        c,
        TerminalCall::FillString { text, .. } if text == "{{token}}"
    )));
}

#[tokio::test]
async fn human_delay_sleeps_for_the_configured_delay() {
    tokio::time::pause();
    let terminal = FakeTerminal::new();
    let mut step = Step::new(StepKind::HumanDelay);
    step.delay = Some(2.0);

    let started = tokio::time::Instant::now();
    run(&terminal, step, &config()).await.unwrap();
    assert!(started.elapsed() >= std::time::Duration::from_secs(2));
}

#[tokio::test]
async fn failed_step_surfaces_a_command_error() {
    let terminal = FakeTerminal::new();
    terminal.fail_operation("Press", "not connected");
    let err = run(&terminal, Step::new(StepKind::PressEnter), &config())
        .await
        .err()
        .unwrap();
    assert_eq!(err.to_string(), "PressEnter: not connected");
}
