// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! AID (attention identifier) keys understood by the emulator.

use std::fmt;

/// A key the adapter can press on the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AidKey {
    Enter,
    Tab,
    /// Program function key 1..=24.
    Pf(u8),
}

impl AidKey {
    /// Build a PF key, rejecting numbers outside 1..=24.
    pub fn pf(n: u8) -> Result<Self, InvalidKey> {
        if (1..=24).contains(&n) {
            Ok(AidKey::Pf(n))
        } else {
            Err(InvalidKey(format!("PF{}", n)))
        }
    }

    /// The exact script-port command for this key.
    pub fn command(&self) -> String {
        match self {
            AidKey::Enter => "Enter".to_string(),
            AidKey::Tab => "Tab".to_string(),
            AidKey::Pf(n) => format!("PF({})", n),
        }
    }
}

impl fmt::Display for AidKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AidKey::Enter => write!(f, "Enter"),
            AidKey::Tab => write!(f, "Tab"),
            AidKey::Pf(n) => write!(f, "PF{}", n),
        }
    }
}

/// An unrecognized key name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid key: {0}")]
pub struct InvalidKey(pub String);

#[cfg(test)]
#[path = "keys_tests.rs"]
mod tests;
