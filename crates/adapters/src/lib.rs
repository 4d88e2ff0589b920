// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O: the emulator subprocess and its script port,
//! local port allocation, process liveness, and screen capture files.

pub mod capture;
pub mod emulator;
pub mod liveness;
pub mod ports;
pub mod script;

pub use capture::{append_screen, initialize_output, CaptureError};
pub use emulator::{EmulatorError, S3270Adapter, TerminalAdapter};
pub use liveness::{ProcessProbe, SysinfoProbe};
pub use ports::{PortAllocator, PortError};
pub use script::{ScriptConnection, ScriptError, ScriptResponse};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use emulator::{FakeTerminal, TerminalCall};
#[cfg(any(test, feature = "test-support"))]
pub use liveness::FakeProbe;
#[cfg(any(test, feature = "test-support"))]
pub use script::FakeScriptServer;
