// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live run telemetry: in-place progress bars or periodic text rows.

use std::sync::Arc;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use t3270_core::{format_hms, ShutdownSignal};

use crate::metrics::MetricsStore;

/// Refresh interval for the progress-bar renderer.
pub const PROGRESS_INTERVAL: Duration = Duration::from_secs(1);

/// Emission interval for text rows.
pub const TEXT_INTERVAL: Duration = Duration::from_secs(5);

/// How the run reports live progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryMode {
    /// Four in-place bars: run duration, active vUsers, CPU%, memory%.
    Progress,
    /// One structured text row every five seconds.
    Text,
    /// No live output (API callers, tests).
    Silent,
}

/// Spawn the telemetry ticker. It stops once shutdown is requested (the
/// scheduler's transition into Drain).
pub fn spawn_telemetry(
    mode: TelemetryMode,
    metrics: Arc<MetricsStore>,
    shutdown: ShutdownSignal,
    concurrency: usize,
) -> tokio::task::JoinHandle<()> {
    match mode {
        TelemetryMode::Progress => tokio::spawn(progress_loop(metrics, shutdown, concurrency)),
        TelemetryMode::Text => tokio::spawn(text_loop(metrics, shutdown, concurrency)),
        TelemetryMode::Silent => tokio::spawn(async {}),
    }
}

fn bar_style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template).unwrap_or_else(|_| ProgressStyle::default_bar())
}

async fn progress_loop(metrics: Arc<MetricsStore>, shutdown: ShutdownSignal, concurrency: usize) {
    let bars = MultiProgress::new();
    let style = bar_style("{prefix:>7} [{bar:40}] {pos:>3}/{len:3} {msg}");

    let run = bars.add(ProgressBar::new(metrics.runtime_secs().max(1)));
    run.set_style(style.clone());
    run.set_prefix("run");

    let vusers = bars.add(ProgressBar::new(concurrency.max(1) as u64));
    vusers.set_style(style.clone());
    vusers.set_prefix("vUsers");

    let cpu = bars.add(ProgressBar::new(100));
    cpu.set_style(style.clone());
    cpu.set_prefix("cpu%");

    let memory = bars.add(ProgressBar::new(100));
    memory.set_style(style);
    memory.set_prefix("mem%");

    let mut interval = tokio::time::interval(PROGRESS_INTERVAL);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        if shutdown.is_requested() {
            break;
        }
        let elapsed = metrics.elapsed().as_secs();
        run.set_position(elapsed.min(metrics.runtime_secs()));
        run.set_message(format!(
            "S:{} D:{} F:{}",
            metrics.started_count(),
            metrics.completed_count(),
            metrics.failed_count()
        ));
        vusers.set_position(metrics.active_workflows().max(0) as u64);
        cpu.set_position(metrics.latest_cpu_percent().round() as u64);
        memory.set_position(metrics.latest_memory_percent().round() as u64);
    }

    run.finish_and_clear();
    vusers.finish_and_clear();
    cpu.finish_and_clear();
    memory.finish_and_clear();
    let _ = bars.clear();
}

async fn text_loop(metrics: Arc<MetricsStore>, shutdown: ShutdownSignal, concurrency: usize) {
    let mut interval = tokio::time::interval(TEXT_INTERVAL);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        if shutdown.is_requested() {
            break;
        }
        println!("{}", text_row(&metrics, concurrency));
    }
}

/// One status row: active/total, started, done, failed, elapsed, remaining,
/// cpu, memory.
pub fn text_row(metrics: &MetricsStore, concurrency: usize) -> String {
    let elapsed = metrics.elapsed().as_secs();
    let remaining = metrics.runtime_secs().saturating_sub(elapsed);
    format!(
        "A:{}/{} S:{} D:{} F:{} E:{} R:{} C:{:.0}% M:{:.0}%",
        metrics.active_workflows().max(0),
        concurrency,
        metrics.started_count(),
        metrics.completed_count(),
        metrics.failed_count(),
        format_hms(elapsed),
        format_hms(remaining),
        metrics.latest_cpu_percent(),
        metrics.latest_memory_percent(),
    )
}

#[cfg(test)]
#[path = "telemetry_tests.rs"]
mod tests;
