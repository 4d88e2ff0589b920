// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Emulator adapters: one long-lived terminal session per worker.

mod process;
mod s3270;

pub use process::{binary_name, launch_args, EmulatorProcess};
pub use s3270::S3270Adapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeTerminal, TerminalCall};

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use t3270_core::AidKey;

/// Connect attempts before giving up.
pub const CONNECT_ATTEMPTS: usize = 10;

/// Delay between connect attempts.
pub const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Attempts for single-command primitives.
pub const COMMAND_ATTEMPTS: usize = 3;

/// Delay between command attempts.
pub const COMMAND_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Polls of `Query(ConnectionState)` while waiting for the emulator.
pub const STATE_POLL_ATTEMPTS: usize = 15;

/// Interval between connection-state polls.
pub const STATE_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Errors from terminal operations.
#[derive(Debug, Error)]
pub enum EmulatorError {
    #[error("host must not be empty")]
    HostEmpty,
    #[error("shutdown requested")]
    ShutdownRequested,
    #[error("connect timeout: {0} never reached connected state")]
    ConnectTimeout(String),
    #[error("spawn failed: {0}")]
    SpawnFailed(String),
    #[error("command failed: {0}")]
    CommandFailed(String),
    #[error("keyboard locked: state {0}")]
    KeyboardLocked(String),
}

impl EmulatorError {
    /// True for the distinguished non-error shutdown outcome.
    pub fn is_shutdown(&self) -> bool {
        matches!(self, EmulatorError::ShutdownRequested)
    }
}

/// One emulator session, owned by exactly one worker for its lifetime.
///
/// Implementations serialize all command exchanges internally; no two
/// commands overlap on one script connection.
#[async_trait]
pub trait TerminalAdapter: Send + Sync + 'static {
    /// Point the session at a host endpoint and script port. Called by the
    /// worker before each workflow.
    async fn rebind(&self, host: &str, port: u16, script_port: u16);

    /// Spawn/attach the emulator and wait until it reports connected.
    async fn connect(&self) -> Result<(), EmulatorError>;

    /// Tear the session down. Never fails; the emulator is allowed to be
    /// already gone.
    async fn disconnect(&self);

    /// Move the cursor to 1-based `(row, column)` and type `text`.
    async fn fill_string(&self, row: u16, column: u16, text: &str) -> Result<(), EmulatorError>;

    /// Type `text` at the current cursor position.
    async fn set_string(&self, text: &str) -> Result<(), EmulatorError>;

    /// Read `length` characters at 1-based `(row, column)`, trimmed.
    async fn get_value(&self, row: u16, column: u16, length: u16)
        -> Result<String, EmulatorError>;

    /// Press an AID key.
    async fn press(&self, key: AidKey) -> Result<(), EmulatorError>;

    /// Wait until the host unlocks the keyboard with an input field.
    async fn wait_for_field(&self, timeout: Duration) -> Result<(), EmulatorError>;

    /// Screen row count.
    async fn rows(&self) -> Result<u16, EmulatorError>;

    /// Screen column count.
    async fn columns(&self) -> Result<u16, EmulatorError>;

    /// The full screen as text lines.
    async fn screen_contents(&self) -> Result<Vec<String>, EmulatorError>;
}
