// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The fixed-size worker pool.
//!
//! Exactly N long-lived workers consume configurations from one job channel.
//! Each worker owns one adapter for its whole lifetime, rebinding it to a
//! fresh script port per job; parallelism equals the worker count.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use t3270_core::Configuration;
use t3270_adapters::TerminalAdapter;

use crate::run::RunContext;
use crate::runner::run_workflow;

/// Backoff when the port allocator reports exhaustion.
const PORT_BACKOFF: Duration = Duration::from_secs(1);

/// Receiver half of the job queue, shared by the worker set.
pub type JobReceiver = Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<Configuration>>>;

/// The job queue: the scheduler is the sole sender, workers the sole
/// receiver set. Dropping the sender closes the queue.
pub fn job_channel() -> (mpsc::UnboundedSender<Configuration>, JobReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (tx, Arc::new(tokio::sync::Mutex::new(rx)))
}

/// Spawn `count` workers, each owning the adapter produced for its index.
pub fn spawn_workers<A, F>(
    count: usize,
    make_adapter: F,
    jobs: JobReceiver,
    ctx: Arc<RunContext>,
) -> JoinSet<()>
where
    A: TerminalAdapter,
    F: Fn(usize) -> A,
{
    let mut workers = JoinSet::new();
    for worker_id in 0..count {
        let adapter = make_adapter(worker_id);
        let jobs = Arc::clone(&jobs);
        let ctx = Arc::clone(&ctx);
        workers.spawn(worker_loop(worker_id, adapter, jobs, ctx));
    }
    workers
}

async fn worker_loop<A: TerminalAdapter>(
    worker_id: usize,
    adapter: A,
    jobs: JobReceiver,
    ctx: Arc<RunContext>,
) {
    loop {
        // Hold the receiver lock only for the take, not for the workflow.
        let job = { jobs.lock().await.recv().await };
        let Some(config) = job else {
            break;
        };

        let Some(script_port) = allocate_port(&ctx).await else {
            continue;
        };
        adapter
            .rebind(&config.host, config.port, script_port)
            .await;
        run_workflow(&adapter, &config, &ctx).await;
    }

    adapter.disconnect().await;
    tracing::debug!(worker = worker_id, "worker exited");
}

/// Allocate a fresh script port, backing off while the range is exhausted.
/// Gives up (dropping the job) once shutdown is requested.
async fn allocate_port(ctx: &RunContext) -> Option<u16> {
    loop {
        match ctx.ports.allocate() {
            Ok(port) => return Some(port),
            Err(e) => {
                if ctx.shutdown.is_requested() {
                    return None;
                }
                tracing::warn!(error = %e, "script ports exhausted, backing off");
                tokio::time::sleep(PORT_BACKOFF).await;
            }
        }
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
