// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! t3270-core: Core types for the t3270 terminal load generator

pub mod clock;
pub mod config;
pub mod injection;
pub mod keys;
pub mod ring;
pub mod shutdown;
pub mod step;
pub mod time_fmt;

pub use clock::{Clock, SystemClock};
pub use config::{ConfigError, Configuration};
pub use injection::{InjectionTable, Rotation};
pub use keys::{AidKey, InvalidKey};
pub use ring::RingBuffer;
pub use shutdown::ShutdownSignal;
pub use step::{Coordinates, Step, StepKind};
pub use time_fmt::{format_hms, format_seconds};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use clock::FakeClock;
