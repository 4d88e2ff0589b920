// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-process run metrics: counters, timing windows, and the system
//! sampler.
//!
//! Hot counters are atomics; the sliding windows sit behind one mutex. A
//! background task samples aggregate CPU and memory every two seconds and
//! triggers a dashboard snapshot rewrite.

use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sysinfo::System;

use t3270_core::{Clock, RingBuffer, ShutdownSignal};

use crate::dashboard::DashboardSink;

/// Capacity of the workflow duration window.
pub const DURATION_WINDOW: usize = 500;

/// Capacity of the CPU and memory windows.
pub const SYSTEM_WINDOW: usize = 120;

/// Interval between system samples and dashboard rewrites.
pub const SAMPLE_INTERVAL: Duration = Duration::from_secs(2);

struct DurationWindow {
    ring: RingBuffer<f64>,
    sum: f64,
    count: u64,
}

/// Thread-safe counters and windows for one run.
pub struct MetricsStore {
    pid: u32,
    started: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    connect_failures: AtomicU64,
    aborted: AtomicU64,
    active: AtomicI64,
    durations: Mutex<DurationWindow>,
    cpu: Mutex<RingBuffer<f64>>,
    memory: Mutex<RingBuffer<f64>>,
    errors: Mutex<Vec<String>>,
    start_epoch: u64,
    start: Instant,
    runtime_secs: u64,
    params: String,
    config_file_path: Option<PathBuf>,
    output_file_path: Option<PathBuf>,
}

impl MetricsStore {
    pub fn new(
        pid: u32,
        runtime_secs: u64,
        params: String,
        config_file_path: Option<PathBuf>,
        output_file_path: Option<PathBuf>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        MetricsStore {
            pid,
            started: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            connect_failures: AtomicU64::new(0),
            aborted: AtomicU64::new(0),
            active: AtomicI64::new(0),
            durations: Mutex::new(DurationWindow {
                ring: RingBuffer::new(DURATION_WINDOW),
                sum: 0.0,
                count: 0,
            }),
            cpu: Mutex::new(RingBuffer::new(SYSTEM_WINDOW)),
            memory: Mutex::new(RingBuffer::new(SYSTEM_WINDOW)),
            errors: Mutex::new(Vec::new()),
            start_epoch: clock.epoch_secs(),
            start: clock.now(),
            runtime_secs,
            params,
            config_file_path,
            output_file_path,
        }
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// A workflow is starting: `started` then `active`, in that order.
    pub fn workflow_started(&self) {
        self.started.fetch_add(1, Ordering::SeqCst);
        self.active.fetch_add(1, Ordering::SeqCst);
    }

    pub fn workflow_completed(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn workflow_failed(&self, message: String) {
        self.active.fetch_sub(1, Ordering::SeqCst);
        self.failed.fetch_add(1, Ordering::SeqCst);
        self.errors.lock().push(message);
    }

    /// A `Connect` step gave up. Counted as a workflow failure only when
    /// `count_as_failure` (the connection-errors policy) is set.
    pub fn connect_failure(&self, message: String, count_as_failure: bool) {
        if count_as_failure {
            self.workflow_failed(message);
        } else {
            self.active.fetch_sub(1, Ordering::SeqCst);
            self.connect_failures.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Shutdown interrupted the workflow: neither success nor failure.
    pub fn workflow_aborted(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
        self.aborted.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_duration(&self, secs: f64) {
        let mut window = self.durations.lock();
        window.ring.push(secs);
        window.sum += secs;
        window.count += 1;
    }

    pub fn sample_system(&self, cpu_percent: f64, memory_percent: f64) {
        self.cpu.lock().push(cpu_percent);
        self.memory.lock().push(memory_percent);
    }

    pub fn started_count(&self) -> u64 {
        self.started.load(Ordering::SeqCst)
    }

    pub fn completed_count(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn failed_count(&self) -> u64 {
        self.failed.load(Ordering::SeqCst)
    }

    pub fn connect_failure_count(&self) -> u64 {
        self.connect_failures.load(Ordering::SeqCst)
    }

    pub fn aborted_count(&self) -> u64 {
        self.aborted.load(Ordering::SeqCst)
    }

    pub fn active_workflows(&self) -> i64 {
        self.active.load(Ordering::SeqCst)
    }

    /// Exact mean over all recorded durations, not just the window.
    pub fn mean_duration_secs(&self) -> f64 {
        let window = self.durations.lock();
        if window.count == 0 {
            0.0
        } else {
            window.sum / window.count as f64
        }
    }

    pub fn mean_cpu_percent(&self) -> f64 {
        mean(&self.cpu.lock())
    }

    pub fn mean_memory_percent(&self) -> f64 {
        mean(&self.memory.lock())
    }

    pub fn latest_cpu_percent(&self) -> f64 {
        self.cpu.lock().iter().last().copied().unwrap_or(0.0)
    }

    pub fn latest_memory_percent(&self) -> f64 {
        self.memory.lock().iter().last().copied().unwrap_or(0.0)
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }

    /// Errors grouped by message, most frequent first.
    pub fn error_histogram(&self) -> Vec<(String, usize)> {
        let errors = self.errors.lock();
        let mut groups: Vec<(String, usize)> = Vec::new();
        for error in errors.iter() {
            match groups.iter_mut().find(|(message, _)| message == error) {
                Some((_, count)) => *count += 1,
                None => groups.push((error.clone(), 1)),
            }
        }
        groups.sort_by(|a, b| b.1.cmp(&a.1));
        groups
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn runtime_secs(&self) -> u64 {
        self.runtime_secs
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            pid: self.pid,
            active_workflows: self.active_workflows().max(0),
            total_workflows_started: self.started_count(),
            total_workflows_completed: self.completed_count(),
            total_workflows_failed: self.failed_count(),
            durations: self.durations.lock().ring.to_vec(),
            cpu_usage: self.cpu.lock().to_vec(),
            memory_usage: self.memory.lock().to_vec(),
            params: self.params.clone(),
            runtime_duration: self.runtime_secs,
            start_timestamp: self.start_epoch,
            config_file_path: path_string(&self.config_file_path),
            output_file_path: path_string(&self.output_file_path),
        }
    }
}

fn mean(ring: &RingBuffer<f64>) -> f64 {
    if ring.is_empty() {
        0.0
    } else {
        ring.iter().sum::<f64>() / ring.len() as f64
    }
}

fn path_string(path: &Option<PathBuf>) -> Option<String> {
    path.as_ref().map(|p| p.display().to_string())
}

/// The per-PID snapshot persisted for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub pid: u32,
    pub active_workflows: i64,
    pub total_workflows_started: u64,
    pub total_workflows_completed: u64,
    pub total_workflows_failed: u64,
    pub durations: Vec<f64>,
    pub cpu_usage: Vec<f64>,
    pub memory_usage: Vec<f64>,
    #[serde(default)]
    pub params: String,
    pub runtime_duration: u64,
    pub start_timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file_path: Option<String>,
}

/// Spawn the background sampler: every [`SAMPLE_INTERVAL`] it appends one
/// CPU and one memory sample and rewrites the dashboard snapshot.
///
/// Runs until the returned handle is aborted.
pub fn spawn_sampler(
    metrics: Arc<MetricsStore>,
    sink: Arc<DashboardSink>,
    shutdown: ShutdownSignal,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut system = System::new();
        let mut interval = tokio::time::interval(SAMPLE_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if shutdown.is_requested() {
                break;
            }

            system.refresh_cpu_usage();
            system.refresh_memory();
            let cpu = system.global_cpu_usage() as f64;
            let memory = if system.total_memory() == 0 {
                0.0
            } else {
                system.used_memory() as f64 / system.total_memory() as f64 * 100.0
            };
            metrics.sample_system(cpu, memory);

            if let Err(e) = sink.write(&metrics.snapshot()) {
                tracing::warn!(error = %e, "dashboard snapshot write failed");
            }
        }
    })
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
