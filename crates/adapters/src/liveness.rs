// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process liveness probes.

use sysinfo::{Pid, ProcessesToUpdate, System};

/// Answers "is this PID still alive?" for dashboard status derivation.
///
/// Injected as a collaborator so readers can be tested without real
/// processes.
pub trait ProcessProbe: Send + Sync {
    fn is_alive(&self, pid: u32) -> bool;
}

/// Probe backed by the system process table.
#[derive(Debug, Clone, Copy, Default)]
pub struct SysinfoProbe;

impl ProcessProbe for SysinfoProbe {
    fn is_alive(&self, pid: u32) -> bool {
        let pid = Pid::from_u32(pid);
        let mut system = System::new();
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        system.process(pid).is_some()
    }
}

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeProbe;

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::ProcessProbe;
    use parking_lot::Mutex;
    use std::collections::HashSet;
    use std::sync::Arc;

    /// A probe with a scripted set of live PIDs.
    #[derive(Debug, Clone, Default)]
    pub struct FakeProbe {
        alive: Arc<Mutex<HashSet<u32>>>,
    }

    impl FakeProbe {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_alive(&self, pid: u32, alive: bool) {
            let mut set = self.alive.lock();
            if alive {
                set.insert(pid);
            } else {
                set.remove(&pid);
            }
        }
    }

    impl ProcessProbe for FakeProbe {
        fn is_alive(&self, pid: u32) -> bool {
            self.alive.lock().contains(&pid)
        }
    }
}

#[cfg(test)]
#[path = "liveness_tests.rs"]
mod tests;
