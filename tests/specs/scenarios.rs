// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine scenarios from the behavioral contract, run on the fake terminal.

use crate::prelude::{login_steps, workflow};

use t3270_adapters::FakeTerminal;
use t3270_core::{Step, StepKind};
use t3270_engine::{run_workflow, RunContext, RunOptions};

#[tokio::test]
async fn single_workflow_happy_path_with_screen_capture() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.html");

    let mut steps = login_steps();
    steps.insert(3, Step::new(StepKind::AsciiScreenGrab));
    let mut config = workflow(steps);
    config.output_file_path = Some(out.clone());

    let terminal = FakeTerminal::new();
    terminal.set_screen_lines(vec!["SIGNON COMPLETE".to_string()]);
    let ctx = RunContext::new(RunOptions::default(), Some(out.clone()));

    run_workflow(&terminal, &config, &ctx).await;

    assert_eq!(ctx.metrics.started_count(), 1);
    assert_eq!(ctx.metrics.completed_count(), 1);
    assert_eq!(ctx.metrics.failed_count(), 0);
    assert!(out.exists(), "captured screen file must exist");
    assert!(std::fs::read_to_string(&out)
        .unwrap()
        .contains("SIGNON COMPLETE"));
}

#[tokio::test]
async fn connect_failure_with_policy_off_counts_nothing() {
    let terminal = FakeTerminal::new();
    terminal.set_connect_fails(true);
    let ctx = RunContext::new(RunOptions::default(), None);

    run_workflow(&terminal, &workflow(login_steps()), &ctx).await;

    assert_eq!(ctx.metrics.started_count(), 1);
    assert_eq!(ctx.metrics.completed_count(), 0);
    assert_eq!(ctx.metrics.failed_count(), 0);
    assert!(ctx.metrics.errors().is_empty());
}

#[tokio::test]
async fn connect_failure_with_policy_on_records_one_entry() {
    let terminal = FakeTerminal::new();
    terminal.set_connect_fails(true);
    let options = RunOptions {
        show_connection_errors: true,
        ..RunOptions::default()
    };
    let ctx = RunContext::new(options, None);

    run_workflow(&terminal, &workflow(login_steps()), &ctx).await;

    assert_eq!(ctx.metrics.failed_count(), 1);
    assert_eq!(ctx.metrics.errors().len(), 1);
}

#[tokio::test]
async fn check_value_mismatch_reports_the_exact_message() {
    let terminal = FakeTerminal::new();
    terminal.set_screen_value(1, 2, "ACTUAL    ");

    let mut check = Step::at(StepKind::CheckValue, 1, 2, "EXPECTED");
    check.coordinates.length = 11;
    let config = workflow(vec![Step::new(StepKind::Connect), check]);
    let ctx = RunContext::new(RunOptions::default(), None);

    run_workflow(&terminal, &config, &ctx).await;

    assert_eq!(ctx.metrics.failed_count(), 1);
    assert_eq!(
        ctx.metrics.errors(),
        vec!["CheckValue failed. Expected: EXPECTED, Found: ACTUAL".to_string()]
    );
}
