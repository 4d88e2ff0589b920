// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-of-run aggregation and the persisted summary file.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use t3270_core::{format_hms, format_seconds};

use crate::metrics::MetricsStore;

/// Aggregated results of one run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started: u64,
    pub completed: u64,
    pub failed: u64,
    pub connect_failures: u64,
    pub mean_duration_secs: f64,
    pub elapsed_secs: u64,
    pub mean_cpu_percent: f64,
    pub mean_memory_percent: f64,
    /// Error messages grouped by text, most frequent first.
    pub errors: Vec<(String, usize)>,
}

/// Aggregate the metrics store into a summary.
pub fn build(metrics: &MetricsStore) -> RunSummary {
    RunSummary {
        started: metrics.started_count(),
        completed: metrics.completed_count(),
        failed: metrics.failed_count(),
        connect_failures: metrics.connect_failure_count(),
        mean_duration_secs: metrics.mean_duration_secs(),
        elapsed_secs: metrics.elapsed().as_secs(),
        mean_cpu_percent: metrics.mean_cpu_percent(),
        mean_memory_percent: metrics.mean_memory_percent(),
        errors: metrics.error_histogram(),
    }
}

/// Render the summary as the text block shown at run end and persisted to
/// the summary file.
pub fn render(summary: &RunSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "workflows started:   {}", summary.started);
    let _ = writeln!(out, "workflows completed: {}", summary.completed);
    let _ = writeln!(out, "workflows failed:    {}", summary.failed);
    let _ = writeln!(out, "connect failures:    {}", summary.connect_failures);
    let _ = writeln!(
        out,
        "mean duration:       {}",
        format_seconds(summary.mean_duration_secs)
    );
    let _ = writeln!(out, "elapsed:             {}", format_hms(summary.elapsed_secs));
    let _ = writeln!(out, "avg cpu:             {:.1}%", summary.mean_cpu_percent);
    let _ = writeln!(
        out,
        "avg memory:          {:.1}%",
        summary.mean_memory_percent
    );
    if !summary.errors.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "errors:");
        for (message, count) in &summary.errors {
            let _ = writeln!(out, "  {:>4}x {}", count, message);
        }
    }
    out
}

/// Write the summary to `<dir>/summary_<PID>.txt`.
pub fn persist(dir: &Path, pid: u32, summary: &RunSummary) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("summary_{}.txt", pid));
    std::fs::write(&path, render(summary))?;
    Ok(path)
}

#[cfg(test)]
#[path = "summary_tests.rs"]
mod tests;
