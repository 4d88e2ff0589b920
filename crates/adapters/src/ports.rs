// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Script-port allocation.

use parking_lot::Mutex;
use thiserror::Error;

/// Highest candidate port handed out by the allocator.
pub const MAX_PORT: u16 = 65000;

/// Errors from port allocation.
#[derive(Debug, Error)]
pub enum PortError {
    #[error("no free script port in {start}..={max}")]
    Exhausted { start: u16, max: u16 },
}

/// Hands out unique, currently-free local TCP ports for script control.
///
/// Candidates run from `start_port + 1` to [`MAX_PORT`], wrapping on
/// exhaustion. Each candidate is probed by binding and immediately releasing
/// a listener; callers that hit [`PortError::Exhausted`] back off and retry.
#[derive(Debug)]
pub struct PortAllocator {
    start: u16,
    max: u16,
    cursor: Mutex<u16>,
}

impl PortAllocator {
    pub fn new(start_port: u16) -> Self {
        Self::with_range(start_port, MAX_PORT)
    }

    /// Allocator over `start_port + 1 ..= max`; `max` is clamped above
    /// `start_port`.
    pub fn with_range(start_port: u16, max: u16) -> Self {
        PortAllocator {
            start: start_port,
            max: max.max(start_port.saturating_add(1)),
            cursor: Mutex::new(start_port),
        }
    }

    /// The next free port, probing each candidate once per sweep.
    pub fn allocate(&self) -> Result<u16, PortError> {
        let mut cursor = self.cursor.lock();
        let span = (self.max - self.start) as u32;
        for _ in 0..span {
            let candidate = if *cursor >= self.max {
                self.start + 1
            } else {
                *cursor + 1
            };
            *cursor = candidate;
            if probe(candidate) {
                return Ok(candidate);
            }
            tracing::trace!(port = candidate, "script port in use, trying next");
        }
        Err(PortError::Exhausted {
            start: self.start + 1,
            max: self.max,
        })
    }
}

/// A port is free if a listener can bind it right now.
fn probe(port: u16) -> bool {
    std::net::TcpListener::bind(("127.0.0.1", port)).is_ok()
}

#[cfg(test)]
#[path = "ports_tests.rs"]
mod tests;
