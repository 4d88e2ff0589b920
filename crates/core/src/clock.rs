// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction so time-derived state is testable.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// A source of monotonic and wall-clock time.
pub trait Clock: Send + Sync {
    /// Monotonic now, for deadlines and elapsed measurements.
    fn now(&self) -> Instant;

    /// Wall-clock now as seconds since the Unix epoch.
    fn epoch_secs(&self) -> u64;
}

/// The real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn epoch_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeClock;

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// A manually advanced clock for tests.
    #[derive(Debug, Clone)]
    pub struct FakeClock {
        base: Instant,
        epoch_base: u64,
        offset: Arc<Mutex<Duration>>,
    }

    impl FakeClock {
        pub fn new() -> Self {
            FakeClock {
                base: Instant::now(),
                epoch_base: 1_700_000_000,
                offset: Arc::new(Mutex::new(Duration::ZERO)),
            }
        }

        /// Start the wall clock at a specific epoch second.
        pub fn at_epoch(epoch_base: u64) -> Self {
            FakeClock {
                epoch_base,
                ..Self::new()
            }
        }

        pub fn advance(&self, by: Duration) {
            *self.offset.lock() += by;
        }
    }

    impl Default for FakeClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> Instant {
            self.base + *self.offset.lock()
        }

        fn epoch_secs(&self) -> u64 {
            self.epoch_base + self.offset.lock().as_secs()
        }
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
