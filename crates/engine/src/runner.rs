// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runs one workflow against one adapter under the run deadline.

use std::path::PathBuf;
use std::time::Duration;

use tokio::time::Instant;

use t3270_core::{Configuration, StepKind};
use t3270_adapters::TerminalAdapter;

use crate::error::StepError;
use crate::executor::execute_step;
use crate::run::RunContext;

/// Wait issued right after a successful `Connect` when the workflow-level
/// flag is set.
const POST_CONNECT_FIELD_WAIT: Duration = Duration::from_secs(1);

enum Outcome {
    Completed,
    Failed(StepError),
    ConnectFailed(StepError),
    Aborted,
}

/// Execute every step of `config` on `adapter`, recording the outcome in
/// the metrics store.
///
/// Never returns an error: step failures are counted and listed, shutdown
/// aborts leave the outcome counters untouched. The shutdown check precedes
/// the started counter, so a workflow aborted before its first step is
/// invisible in the totals.
pub async fn run_workflow<A: TerminalAdapter + ?Sized>(
    adapter: &A,
    config: &Configuration,
    ctx: &RunContext,
) {
    if ctx.shutdown.is_requested() {
        return;
    }
    ctx.metrics.workflow_started();
    let started = Instant::now();

    // Force a clean session; the previous workflow may have left one behind.
    adapter.disconnect().await;

    let output_path = output_path(config);
    let mut outcome = Outcome::Completed;

    for step in &config.steps {
        if ctx.shutdown.is_requested() || ctx.deadline_passed() {
            outcome = Outcome::Aborted;
            break;
        }
        if let Some(limit) = ctx.options.workflow_timeout {
            if started.elapsed() >= limit {
                outcome = Outcome::Failed(StepError::WorkflowTimeout(limit.as_secs_f64()));
                break;
            }
        }

        match execute_step(adapter, step, config, ctx, &output_path).await {
            Ok(()) => {
                if step.kind == StepKind::Connect && config.wait_for_field {
                    if let Err(e) = adapter.wait_for_field(POST_CONNECT_FIELD_WAIT).await {
                        tracing::debug!(error = %e, "post-connect field wait failed");
                    }
                }
            }
            Err(e) if e.is_shutdown() => {
                outcome = Outcome::Aborted;
                break;
            }
            Err(e) if e.is_connect_failure() => {
                tracing::warn!(host = %config.host, error = %e, "workflow connect failed");
                outcome = Outcome::ConnectFailed(e);
                break;
            }
            Err(e) => {
                tracing::warn!(step = %step.kind, error = %e, "workflow step failed");
                outcome = Outcome::Failed(e);
                break;
            }
        }
    }

    ctx.metrics.record_duration(started.elapsed().as_secs_f64());
    match outcome {
        Outcome::Completed => ctx.metrics.workflow_completed(),
        Outcome::Failed(e) => ctx.metrics.workflow_failed(e.to_string()),
        Outcome::ConnectFailed(e) => ctx
            .metrics
            .connect_failure(e.to_string(), ctx.options.show_connection_errors),
        Outcome::Aborted => ctx.metrics.workflow_aborted(),
    }
}

/// Run a single workflow once on a dedicated adapter: the no-scheduler mode.
pub async fn run_single<A: TerminalAdapter + ?Sized>(
    adapter: &A,
    config: &Configuration,
    ctx: &RunContext,
) {
    let script_port = match ctx.ports.allocate() {
        Ok(port) => port,
        Err(e) => {
            tracing::error!(error = %e, "no script port available");
            return;
        }
    };
    adapter.rebind(&config.host, config.port, script_port).await;
    run_workflow(adapter, config, ctx).await;
    adapter.disconnect().await;
}

/// The configured output file, or a scratch path for workflows that capture
/// nothing.
fn output_path(config: &Configuration) -> PathBuf {
    config.output_file_path.clone().unwrap_or_else(|| {
        std::env::temp_dir().join(format!("t3270_{}.out", uuid::Uuid::new_v4()))
    })
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
