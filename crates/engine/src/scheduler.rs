// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The ramp scheduler: releases workflows in batches until the run deadline,
//! then drains the pool under a grace period.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use t3270_core::{Configuration, InjectionTable};
use t3270_adapters::TerminalAdapter;

use crate::dashboard::DashboardSink;
use crate::metrics::spawn_sampler;
use crate::pool::{job_channel, spawn_workers};
use crate::run::RunContext;
use crate::summary::{self, RunSummary};
use crate::telemetry::{spawn_telemetry, TelemetryMode};

/// How long Drain waits for in-flight workflows before abandoning workers.
pub const DRAIN_GRACE: Duration = Duration::from_secs(30);

/// Run the full load-generation state machine: Init, Schedule, Drain,
/// Summarize.
///
/// The scheduler is the sole sender on the job queue. It stops producing
/// when the remaining run time no longer fits a ramp delay, signals
/// shutdown, closes the queue, and gives workers [`DRAIN_GRACE`] to finish
/// in-flight work.
pub async fn run_load<A, F>(
    template: &Configuration,
    injection: &InjectionTable,
    make_adapter: F,
    ctx: Arc<RunContext>,
    sink: Arc<DashboardSink>,
    telemetry: TelemetryMode,
) -> RunSummary
where
    A: TerminalAdapter,
    F: Fn(usize) -> A,
{
    // Init
    ctx.shutdown.reset();
    let n = ctx.options.concurrency;
    let deadline = ctx
        .deadline()
        .unwrap_or_else(|| Instant::now() + ctx.options.runtime);
    let ramp_delay = Duration::from_secs_f64(template.ramp_up_delay);
    let batch_size = template.ramp_up_batch_size;
    let mut rotation = injection.rotation();
    let mut first_batch = true;

    let sampler = spawn_sampler(
        Arc::clone(&ctx.metrics),
        Arc::clone(&sink),
        ctx.shutdown.clone(),
    );
    let ticker = spawn_telemetry(
        telemetry,
        Arc::clone(&ctx.metrics),
        ctx.shutdown.clone(),
        n,
    );

    let (tx, rx) = job_channel();
    let mut workers = spawn_workers(n, make_adapter, rx, Arc::clone(&ctx));

    tracing::info!(
        workers = n,
        runtime_secs = ctx.options.runtime.as_secs(),
        batch_size,
        ramp_delay_secs = template.ramp_up_delay,
        injection_entries = injection.len(),
        "scheduling started"
    );

    // Schedule
    loop {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        // Do not start workflows that cannot do useful work before shutdown.
        if deadline - now <= ramp_delay {
            tracing::info!("stopped scheduling: remaining time within one ramp delay");
            break;
        }

        let active = ctx.metrics.active_workflows().max(0) as usize;
        let available = n.saturating_sub(active);
        if available == 0 {
            tokio::time::sleep(ramp_delay).await;
            continue;
        }

        let to_start = batch_size.min(available);
        for _ in 0..to_start {
            let concrete = match rotation.next_entry() {
                Some(entry) => template.materialize(entry),
                None => template.clone(),
            };
            if tx.send(concrete).is_err() {
                break;
            }
        }
        tracing::debug!(released = to_start, active, "released batch");

        if first_batch {
            first_batch = false;
        } else {
            tokio::time::sleep(ramp_delay).await;
        }
    }

    // Drain
    ctx.shutdown.request();
    drop(tx);
    let drained = tokio::time::timeout(DRAIN_GRACE, async {
        while workers.join_next().await.is_some() {}
    })
    .await;
    if drained.is_err() {
        tracing::warn!(
            grace_secs = DRAIN_GRACE.as_secs(),
            "drain grace elapsed; abandoning workers still waiting on emulators"
        );
        workers.abort_all();
    }
    sampler.abort();
    let _ = ticker.await;

    // Summarize
    let summary = summary::build(&ctx.metrics);
    if let Err(e) = summary::persist(&ctx.options.log_dir, ctx.metrics.pid(), &summary) {
        tracing::warn!(error = %e, "summary file write failed");
    }
    if let Err(e) = sink.write(&ctx.metrics.snapshot()) {
        tracing::warn!(error = %e, "final dashboard snapshot write failed");
    }
    tracing::info!(
        started = summary.started,
        completed = summary.completed,
        failed = summary.failed,
        "run complete"
    );
    summary
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
