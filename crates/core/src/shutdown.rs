// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run-wide shutdown flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable cancellation flag observed at every natural checkpoint: before
/// starting a workflow, between steps, inside connect retry loops, inside
/// the emulator spawn wait loop.
///
/// Set by the scheduler when the run duration elapses and by external kill
/// requests; cleared at the next run's Init. A request is a distinguished
/// non-error outcome, never a workflow failure.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    flag: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "shutdown_tests.rs"]
mod tests;
