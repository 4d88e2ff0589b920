// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire-level scenarios: the real adapter against a scripted script port.

use crate::prelude::{login_steps, workflow};

use t3270_adapters::{FakeScriptServer, S3270Adapter, TerminalAdapter};
use t3270_core::ShutdownSignal;
use t3270_engine::{run_workflow, RunContext, RunOptions};

#[tokio::test]
async fn a_workflow_emits_the_exact_command_sequence() {
    let server = FakeScriptServer::spawn().await.unwrap();
    let adapter = S3270Adapter::attach(server.port(), ShutdownSignal::new());
    adapter.rebind("127.0.0.1", 3270, server.port()).await;

    let ctx = RunContext::new(RunOptions::default(), None);
    run_workflow(&adapter, &workflow(login_steps()), &ctx).await;

    assert_eq!(ctx.metrics.completed_count(), 1);
    let received = server.received();
    assert_eq!(received[0], "Connect(127.0.0.1:3270)");
    assert_eq!(received[1], "Query(ConnectionState)");
    assert_eq!(received[2], "MoveCursor(3,19)");
    assert_eq!(received[3], "String(user1)");
    assert_eq!(received[4], "Enter");
    assert_eq!(received[5], "Quit");
}

#[tokio::test]
async fn transport_recovery_is_invisible_to_the_workflow() {
    let server = FakeScriptServer::spawn().await.unwrap();
    let adapter = S3270Adapter::attach(server.port(), ShutdownSignal::new());
    adapter.rebind("127.0.0.1", 3270, server.port()).await;
    let ctx = RunContext::new(RunOptions::default(), None);

    adapter.connect().await.unwrap();
    // The script connection dies after a successful command; the next
    // command must reconnect once, silently.
    server.drop_connection_before_next_reply();

    run_workflow(&adapter, &workflow(login_steps()), &ctx).await;

    assert_eq!(ctx.metrics.completed_count(), 1);
    assert_eq!(ctx.metrics.failed_count(), 0);
    assert!(server.connection_count() >= 2, "one reconnect expected");
}

#[tokio::test]
async fn semantic_errors_fail_the_step_not_the_transport() {
    let server = FakeScriptServer::spawn().await.unwrap();
    server.fail_command("MoveCursor(", "protected field");
    let adapter = S3270Adapter::attach(server.port(), ShutdownSignal::new());
    adapter.rebind("127.0.0.1", 3270, server.port()).await;
    let ctx = RunContext::new(RunOptions::default(), None);

    run_workflow(&adapter, &workflow(login_steps()), &ctx).await;

    assert_eq!(ctx.metrics.failed_count(), 1);
    assert!(ctx.metrics.errors()[0].contains("protected field"));
    // Three command-level attempts, each sent exactly once: the free
    // transport retry never fires for semantic failures.
    let moves = server
        .received()
        .iter()
        .filter(|c| c.starts_with("MoveCursor("))
        .count();
    assert_eq!(moves, 3);
}
