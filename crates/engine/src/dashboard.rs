// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dashboard snapshot files.
//!
//! One JSON file per PID under a shared directory. Writers rewrite their own
//! file wholesale every couple of seconds; readers enumerate every file,
//! skip unparseable ones, derive status on demand, and garbage-collect
//! snapshots of processes that died without cleaning up.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use t3270_core::Clock;
use t3270_adapters::ProcessProbe;

use crate::metrics::MetricsSnapshot;

/// Quiescence before a `Killed` snapshot file is deleted.
pub const STALE_AFTER: Duration = Duration::from_secs(600);

/// Lifecycle state derived from a snapshot at read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    Running,
    Ended,
    Killed,
}

/// A snapshot enriched with the derived fields the dashboard shows.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardEntry {
    #[serde(flatten)]
    pub snapshot: MetricsSnapshot,
    pub status: RunStatus,
    #[serde(rename = "timeLeft")]
    pub time_left: u64,
    #[serde(rename = "isRunning")]
    pub is_running: bool,
}

/// Writes and reads per-PID snapshot files in a shared directory.
///
/// The directory and the liveness probe are injected, so readers are
/// testable without ambient filesystem or process-table coupling.
pub struct DashboardSink {
    dir: PathBuf,
    probe: Arc<dyn ProcessProbe>,
    clock: Arc<dyn Clock>,
    stale_after: Duration,
}

impl DashboardSink {
    pub fn new(dir: PathBuf, probe: Arc<dyn ProcessProbe>, clock: Arc<dyn Clock>) -> Self {
        DashboardSink {
            dir,
            probe,
            clock,
            stale_after: STALE_AFTER,
        }
    }

    /// Override the stale-file quiescence window.
    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    /// The conventional shared directory: `<userConfigDir>/3270Connect/dashboard`.
    pub fn default_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("3270Connect")
            .join("dashboard")
    }

    pub fn metrics_path(&self, pid: u32) -> PathBuf {
        self.dir.join(format!("metrics_{}.json", pid))
    }

    /// Persist one snapshot, replacing the previous file in a single rename
    /// so readers never see a torn write.
    pub fn write(&self, snapshot: &MetricsSnapshot) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.metrics_path(snapshot.pid);
        let tmp = self.dir.join(format!("metrics_{}.json.tmp", snapshot.pid));
        let body = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(&tmp, body)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Every readable snapshot with derived status, GC-ing stale `Killed`
    /// files along the way. Unparseable files are skipped silently.
    pub fn read_all(&self) -> Vec<DashboardEntry> {
        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            return Vec::new();
        };

        let mut out = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.starts_with("metrics_") || !name.ends_with(".json") {
                continue;
            }
            let Some(snapshot) = read_snapshot(&path) else {
                continue;
            };

            let derived = self.derive(snapshot);
            if derived.status == RunStatus::Killed && self.is_stale(&path) {
                tracing::debug!(path = %path.display(), "removing stale killed snapshot");
                let _ = std::fs::remove_file(&path);
                continue;
            }
            out.push(derived);
        }
        out.sort_by_key(|e| e.snapshot.pid);
        out
    }

    /// Delete this run's snapshot file.
    pub fn remove(&self, pid: u32) {
        let _ = std::fs::remove_file(self.metrics_path(pid));
    }

    fn derive(&self, snapshot: MetricsSnapshot) -> DashboardEntry {
        let is_running = self.probe.is_alive(snapshot.pid);
        let elapsed = self.clock.epoch_secs().saturating_sub(snapshot.start_timestamp);
        let time_left = snapshot.runtime_duration.saturating_sub(elapsed);
        let status = if is_running {
            if time_left > 0 {
                RunStatus::Running
            } else {
                RunStatus::Ended
            }
        } else if time_left == 0 {
            RunStatus::Ended
        } else {
            RunStatus::Killed
        };
        DashboardEntry {
            snapshot,
            status,
            time_left,
            is_running,
        }
    }

    /// A file is stale once its mtime is older than the quiescence window.
    /// Live aggregates are rewritten every sample, so their mtime stays
    /// fresh.
    fn is_stale(&self, path: &Path) -> bool {
        let Ok(metadata) = std::fs::metadata(path) else {
            return false;
        };
        let Ok(modified) = metadata.modified() else {
            return false;
        };
        match modified.elapsed() {
            Ok(age) => age >= self.stale_after,
            Err(_) => false,
        }
    }
}

fn read_snapshot(path: &Path) -> Option<MetricsSnapshot> {
    let raw = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&raw).ok()
}

#[cfg(test)]
#[path = "dashboard_tests.rs"]
mod tests;
