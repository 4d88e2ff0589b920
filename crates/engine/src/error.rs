// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for workflow execution

use thiserror::Error;

/// Outcome of a failed step.
///
/// Step errors are local to the workflow runner: they are recorded in the
/// metrics store and never propagate to the worker or the scheduler.
#[derive(Debug, Error)]
pub enum StepError {
    /// Distinguished non-error: the run is shutting down. Counters stay
    /// untouched.
    #[error("shutdown requested")]
    ShutdownRequested,
    /// The `Connect` step exhausted its retries. Counted as a workflow
    /// failure only when the connection-errors policy is enabled.
    #[error("connect failed: {0}")]
    ConnectFailed(String),
    #[error("CheckValue failed. Expected: {expected}, Found: {found}")]
    CheckValueMismatch { expected: String, found: String },
    #[error("workflow timed out after {0:.1}s")]
    WorkflowTimeout(f64),
    #[error("{step}: {message}")]
    CommandFailed { step: String, message: String },
    #[error("capture output failed: {0}")]
    Capture(String),
}

impl StepError {
    pub fn is_shutdown(&self) -> bool {
        matches!(self, StepError::ShutdownRequested)
    }

    pub fn is_connect_failure(&self) -> bool {
        matches!(self, StepError::ConnectFailed(_))
    }
}
