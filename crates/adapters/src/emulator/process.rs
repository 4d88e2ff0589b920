// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Emulator subprocess launch and teardown.

use std::path::PathBuf;

use tokio::process::{Child, Command};

use super::EmulatorError;

/// Directory override for the emulator binaries; falls back to `PATH`.
pub const EMULATOR_DIR_ENV: &str = "T3270_EMULATOR_DIR";

/// The emulator binary for this platform.
///
/// `s3270` drives the headless terminal; the GUI variants are `x3270`
/// (X11) and `wc3270` (Windows).
pub fn binary_name(headless: bool) -> &'static str {
    if headless {
        "s3270"
    } else if cfg!(windows) {
        "wc3270"
    } else {
        "x3270"
    }
}

fn resolve_binary(headless: bool) -> PathBuf {
    let name = binary_name(headless);
    match std::env::var_os(EMULATOR_DIR_ENV) {
        Some(dir) => PathBuf::from(dir).join(name),
        None => PathBuf::from(name),
    }
}

/// The exact command line for one emulator launch.
///
/// The argument order differs between the headless and GUI variants and is
/// preserved for compatibility with the underlying tools.
pub fn launch_args(
    binary: &str,
    script_port: u16,
    host: &str,
    port: u16,
    headless: bool,
) -> Vec<String> {
    let xrm = format!("{}.unlockDelay: False", binary);
    let target = format!("{}:{}", host, port);
    if headless {
        vec![
            "-scriptport".to_string(),
            script_port.to_string(),
            "-xrm".to_string(),
            xrm,
            "-model".to_string(),
            "3279-2".to_string(),
            target,
        ]
    } else {
        vec![
            "-xrm".to_string(),
            xrm,
            "-model".to_string(),
            "3279-2".to_string(),
            "-scriptport".to_string(),
            script_port.to_string(),
            target,
        ]
    }
}

/// A running emulator child process.
#[derive(Debug)]
pub struct EmulatorProcess {
    child: Child,
    binary: String,
}

impl EmulatorProcess {
    /// Launch the platform emulator pointed at `host:port`, exposing its
    /// script port on `script_port`.
    pub fn spawn(
        host: &str,
        port: u16,
        script_port: u16,
        headless: bool,
    ) -> Result<Self, EmulatorError> {
        let path = resolve_binary(headless);
        let binary = binary_name(headless).to_string();
        let args = launch_args(&binary, script_port, host, port, headless);

        tracing::debug!(binary = %path.display(), ?args, "spawning emulator");

        let child = Command::new(&path)
            .args(&args)
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EmulatorError::SpawnFailed(format!("{}: {}", path.display(), e)))?;

        Ok(EmulatorProcess { child, binary })
    }

    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Kill the child and reap it.
    pub async fn kill(&mut self) {
        if let Err(e) = self.child.kill().await {
            tracing::debug!(binary = %self.binary, error = %e, "emulator kill failed");
        }
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
