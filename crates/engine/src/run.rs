// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run-wide context passed down from Init.
//!
//! All run-scoped state (shutdown flag, counters, port cursor) lives here
//! rather than in globals, so a second concurrent run in the same address
//! space behaves independently.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use t3270_core::{Clock, ShutdownSignal, SystemClock};
use t3270_adapters::PortAllocator;

use crate::metrics::MetricsStore;

/// Default first script port handed to the port allocator.
pub const DEFAULT_START_PORT: u16 = 5000;

/// Knobs for one load-generation run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Worker count; one virtual user per worker.
    pub concurrency: usize,
    /// Wall-clock run duration. Zero means a single-workflow run with no
    /// deadline.
    pub runtime: Duration,
    /// Drive `s3270` instead of a GUI emulator.
    pub headless: bool,
    /// Count connect failures as workflow failures and record them.
    pub show_connection_errors: bool,
    /// Hard per-workflow deadline; `None` disables.
    pub workflow_timeout: Option<Duration>,
    /// Raw capture output instead of HTML.
    pub api_mode: bool,
    /// Script ports are allocated above this port.
    pub start_port: u16,
    /// Recorded in the dashboard snapshot.
    pub config_file_path: Option<PathBuf>,
    /// Human-readable run parameters for the dashboard.
    pub params: String,
    /// Directory for per-PID logs and summaries.
    pub log_dir: PathBuf,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            concurrency: 1,
            runtime: Duration::ZERO,
            headless: true,
            show_connection_errors: false,
            workflow_timeout: None,
            api_mode: false,
            start_port: DEFAULT_START_PORT,
            config_file_path: None,
            params: String::new(),
            log_dir: PathBuf::from("logs"),
        }
    }
}

/// Everything a worker or the scheduler needs to share for one run.
pub struct RunContext {
    pub shutdown: ShutdownSignal,
    pub metrics: Arc<MetricsStore>,
    pub ports: Arc<PortAllocator>,
    pub options: RunOptions,
    deadline: Option<Instant>,
    token_warned: AtomicBool,
}

impl RunContext {
    pub fn new(options: RunOptions, output_file_path: Option<PathBuf>) -> Self {
        Self::with_clock(options, output_file_path, Arc::new(SystemClock))
    }

    pub fn with_clock(
        options: RunOptions,
        output_file_path: Option<PathBuf>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let deadline = if options.runtime.is_zero() {
            None
        } else {
            Some(Instant::now() + options.runtime)
        };
        let metrics = Arc::new(MetricsStore::new(
            std::process::id(),
            options.runtime.as_secs(),
            options.params.clone(),
            options.config_file_path.clone(),
            output_file_path,
            clock,
        ));
        RunContext {
            shutdown: ShutdownSignal::new(),
            metrics,
            ports: Arc::new(PortAllocator::new(options.start_port)),
            options,
            deadline,
            token_warned: AtomicBool::new(false),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// True exactly once per run: the caller that wins emits the warning
    /// about a missing token.
    pub fn warn_token_once(&self) -> bool {
        !self.token_warned.swap(true, Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
