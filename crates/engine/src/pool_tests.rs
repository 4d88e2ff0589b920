// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use parking_lot::Mutex;

use super::{job_channel, spawn_workers};
use crate::run::{RunContext, RunOptions};
use t3270_adapters::{FakeTerminal, TerminalCall};
use t3270_core::{Configuration, Step, StepKind};

fn workflow(host: &str) -> Configuration {
    Configuration {
        host: host.to_string(),
        port: 3270,
        steps: vec![Step::new(StepKind::Connect), Step::new(StepKind::Disconnect)],
        output_file_path: None,
        wait_for_field: false,
        token: None,
        ramp_up_batch_size: 10,
        ramp_up_delay: 1.0,
        input_file_path: None,
    }
}

#[tokio::test]
async fn workers_drain_the_queue_and_exit_on_close() {
    let ctx = Arc::new(RunContext::new(RunOptions::default(), None));
    let (tx, rx) = job_channel();
    let terminals: Arc<Mutex<Vec<FakeTerminal>>> = Arc::new(Mutex::new(Vec::new()));

    let make = {
        let terminals = Arc::clone(&terminals);
        move |_id: usize| {
            let terminal = FakeTerminal::new();
            terminals.lock().push(terminal.clone());
            terminal
        }
    };
    let mut workers = spawn_workers(2, make, rx, Arc::clone(&ctx));

    for _ in 0..5 {
        tx.send(workflow("127.0.0.1")).unwrap();
    }
    drop(tx);
    while workers.join_next().await.is_some() {}

    assert_eq!(ctx.metrics.started_count(), 5);
    assert_eq!(ctx.metrics.completed_count(), 5);
    assert_eq!(ctx.metrics.active_workflows(), 0);
}

#[tokio::test]
async fn one_adapter_per_worker_for_the_pool_lifetime() {
    let ctx = Arc::new(RunContext::new(RunOptions::default(), None));
    let (tx, rx) = job_channel();
    let terminals: Arc<Mutex<Vec<FakeTerminal>>> = Arc::new(Mutex::new(Vec::new()));

    let make = {
        let terminals = Arc::clone(&terminals);
        move |_id: usize| {
            let terminal = FakeTerminal::new();
            terminals.lock().push(terminal.clone());
            terminal
        }
    };
    let mut workers = spawn_workers(3, make, rx, Arc::clone(&ctx));
    drop(tx);
    while workers.join_next().await.is_some() {}

    // Exactly one adapter was created per worker, no more.
    assert_eq!(terminals.lock().len(), 3);
}

#[tokio::test]
async fn each_job_gets_a_fresh_script_port() {
    let ctx = Arc::new(RunContext::new(RunOptions::default(), None));
    let (tx, rx) = job_channel();
    let terminal = FakeTerminal::new();
    let shared = terminal.clone();

    let mut workers = spawn_workers(1, move |_| shared.clone(), rx, Arc::clone(&ctx));

    tx.send(workflow("hostA")).unwrap();
    tx.send(workflow("hostB")).unwrap();
    drop(tx);
    while workers.join_next().await.is_some() {}

    let rebinds: Vec<(String, u16)> = terminal
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            TerminalCall::Rebind {
                host, script_port, ..
            } => Some((host, script_port)),
            _ => None,
        })
        .collect();
    assert_eq!(rebinds.len(), 2);
    assert_eq!(rebinds[0].0, "hostA");
    assert_eq!(rebinds[1].0, "hostB");
    assert_ne!(rebinds[0].1, rebinds[1].1, "script port must be fresh per job");
}

#[tokio::test]
async fn workers_disconnect_their_adapter_on_exit() {
    let ctx = Arc::new(RunContext::new(RunOptions::default(), None));
    let (tx, rx) = job_channel();
    let terminal = FakeTerminal::new();
    let shared = terminal.clone();

    let mut workers = spawn_workers(1, move |_| shared.clone(), rx, ctx);
    drop(tx);
    while workers.join_next().await.is_some() {}

    assert_eq!(terminal.calls(), vec![TerminalCall::Disconnect]);
}
