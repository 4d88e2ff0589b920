// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow steps and screen coordinates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::keys::AidKey;

/// A screen position plus an optional read length.
///
/// Rows and columns are 1-based as the user sees them on the terminal.
/// `(0, 0)` means "wherever the cursor currently is".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(rename = "Row", default)]
    pub row: u16,
    #[serde(rename = "Column", default)]
    pub column: u16,
    #[serde(rename = "Length", default)]
    pub length: u16,
}

impl Coordinates {
    /// True when both row and column are zero (cursor-position form).
    pub fn is_cursor(&self) -> bool {
        self.row == 0 && self.column == 0
    }

    /// True when both row and column are addressed (1-based form).
    pub fn is_addressed(&self) -> bool {
        self.row > 0 && self.column > 0
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.column)
    }
}

/// The kind of a workflow step.
///
/// Serialized as the bare step name (`"Connect"`, `"PressPF7"`, ...) so
/// workflow JSON reads the way users write it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Connect,
    Disconnect,
    FillString,
    CheckValue,
    AsciiScreenGrab,
    WaitForField,
    PressEnter,
    PressTab,
    /// Program function key 1..=24.
    PressPf(u8),
    HumanDelay,
    InitializeOutput,
}

impl StepKind {
    /// The AID key this step sends, if it is a key press.
    pub fn aid_key(&self) -> Option<AidKey> {
        match self {
            StepKind::PressEnter => Some(AidKey::Enter),
            StepKind::PressTab => Some(AidKey::Tab),
            StepKind::PressPf(n) => Some(AidKey::Pf(*n)),
            _ => None,
        }
    }

    /// True for `PressEnter`, `PressTab`, and `PressPF1..24`.
    pub fn is_key_press(&self) -> bool {
        self.aid_key().is_some()
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepKind::Connect => write!(f, "Connect"),
            StepKind::Disconnect => write!(f, "Disconnect"),
            StepKind::FillString => write!(f, "FillString"),
            StepKind::CheckValue => write!(f, "CheckValue"),
            StepKind::AsciiScreenGrab => write!(f, "AsciiScreenGrab"),
            StepKind::WaitForField => write!(f, "WaitForField"),
            StepKind::PressEnter => write!(f, "PressEnter"),
            StepKind::PressTab => write!(f, "PressTab"),
            StepKind::PressPf(n) => write!(f, "PressPF{}", n),
            StepKind::HumanDelay => write!(f, "HumanDelay"),
            StepKind::InitializeOutput => write!(f, "InitializeOutput"),
        }
    }
}

impl FromStr for StepKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s {
            "Connect" => StepKind::Connect,
            "Disconnect" => StepKind::Disconnect,
            "FillString" => StepKind::FillString,
            "CheckValue" => StepKind::CheckValue,
            "AsciiScreenGrab" => StepKind::AsciiScreenGrab,
            "WaitForField" => StepKind::WaitForField,
            "PressEnter" => StepKind::PressEnter,
            "PressTab" => StepKind::PressTab,
            "HumanDelay" => StepKind::HumanDelay,
            "InitializeOutput" => StepKind::InitializeOutput,
            other => {
                let n: u8 = other
                    .strip_prefix("PressPF")
                    .and_then(|d| d.parse().ok())
                    .ok_or_else(|| format!("unknown step type: {}", other))?;
                if !(1..=24).contains(&n) {
                    return Err(format!("PF key out of range: {}", n));
                }
                StepKind::PressPf(n)
            }
        };
        Ok(kind)
    }
}

impl Serialize for StepKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StepKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One step of a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(rename = "Type")]
    pub kind: StepKind,
    #[serde(rename = "Coordinates", default)]
    pub coordinates: Coordinates,
    #[serde(rename = "Text", default)]
    pub text: String,
    /// Seconds; used by `HumanDelay` and `WaitForField`.
    #[serde(rename = "Delay", default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<f64>,
}

impl Step {
    /// A step of `kind` with no coordinates, text, or delay.
    pub fn new(kind: StepKind) -> Self {
        Step {
            kind,
            coordinates: Coordinates::default(),
            text: String::new(),
            delay: None,
        }
    }

    /// A step addressed at `(row, column)` carrying `text`.
    pub fn at(kind: StepKind, row: u16, column: u16, text: impl Into<String>) -> Self {
        Step {
            kind,
            coordinates: Coordinates {
                row,
                column,
                length: 0,
            },
            text: text.into(),
            delay: None,
        }
    }
}

#[cfg(test)]
#[path = "step_tests.rs"]
mod tests;
