// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow configuration: loading, validation, and materialization.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::injection;
use crate::step::{Step, StepKind};

fn default_wait_for_field() -> bool {
    true
}

fn default_ramp_batch() -> usize {
    10
}

fn default_ramp_delay() -> f64 {
    1.0
}

/// Errors raised while loading or validating configuration.
///
/// Any of these aborts the run before Init with a non-zero exit.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("host must not be empty")]
    MissingHost,
    #[error("port must be positive")]
    InvalidPort,
    #[error("OutputFilePath is required when a step is AsciiScreenGrab")]
    MissingOutputPath,
    #[error("step {index} ({kind}): row and column must both be positive{hint}")]
    BadCoordinates {
        index: usize,
        kind: String,
        hint: &'static str,
    },
    #[error("step {index} (HumanDelay): Delay must be positive")]
    BadDelay { index: usize },
    #[error("RampUpBatchSize must be positive")]
    BadRampBatch,
    #[error("RampUpDelay must be positive")]
    BadRampDelay,
    #[error("injection file {path}: {message}")]
    BadInjection { path: PathBuf, message: String },
}

/// A workflow: one host endpoint plus the ordered steps to run against it.
///
/// Immutable once loaded; the scheduler materializes fresh copies per
/// released virtual user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(rename = "Host")]
    pub host: String,
    #[serde(rename = "Port")]
    pub port: u16,
    #[serde(rename = "Steps", default)]
    pub steps: Vec<Step>,
    #[serde(rename = "OutputFilePath", default, skip_serializing_if = "Option::is_none")]
    pub output_file_path: Option<PathBuf>,
    /// Auto-wait for an input field after `Connect`.
    #[serde(rename = "WaitForField", default = "default_wait_for_field")]
    pub wait_for_field: bool,
    /// Substituted wherever step text contains `{{token}}`.
    #[serde(rename = "Token", default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(rename = "RampUpBatchSize", default = "default_ramp_batch")]
    pub ramp_up_batch_size: usize,
    /// Seconds between ramp batches.
    #[serde(rename = "RampUpDelay", default = "default_ramp_delay")]
    pub ramp_up_delay: f64,
    /// When set, steps are derived from an external script file.
    #[serde(rename = "InputFilePath", default, skip_serializing_if = "Option::is_none")]
    pub input_file_path: Option<PathBuf>,
}

impl Configuration {
    /// Load a configuration from a JSON file. Does not validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check the structural rules the engine depends on.
    ///
    /// `FillString` accepts addressed coordinates or the `(0,0)` cursor form;
    /// `CheckValue` accepts addressed coordinates only. A half-zero pair is
    /// always rejected.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::MissingHost);
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if self.ramp_up_batch_size == 0 {
            return Err(ConfigError::BadRampBatch);
        }
        if self.ramp_up_delay <= 0.0 {
            return Err(ConfigError::BadRampDelay);
        }

        let grabs = self
            .steps
            .iter()
            .any(|s| s.kind == StepKind::AsciiScreenGrab);
        if grabs && self.output_file_path.is_none() {
            return Err(ConfigError::MissingOutputPath);
        }

        for (index, step) in self.steps.iter().enumerate() {
            match step.kind {
                StepKind::FillString => {
                    if !step.coordinates.is_addressed() && !step.coordinates.is_cursor() {
                        return Err(ConfigError::BadCoordinates {
                            index,
                            kind: step.kind.to_string(),
                            hint: " (or both zero for the cursor position)",
                        });
                    }
                }
                StepKind::CheckValue => {
                    if !step.coordinates.is_addressed() {
                        return Err(ConfigError::BadCoordinates {
                            index,
                            kind: step.kind.to_string(),
                            hint: "",
                        });
                    }
                }
                StepKind::HumanDelay => {
                    if step.delay.unwrap_or(0.0) <= 0.0 {
                        return Err(ConfigError::BadDelay { index });
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// A fresh configuration with injection `entry` applied to every step's
    /// text. The template itself is never mutated.
    pub fn materialize(&self, entry: &HashMap<String, String>) -> Configuration {
        let mut config = self.clone();
        if !entry.is_empty() {
            for step in &mut config.steps {
                step.text = injection::apply(entry, &step.text);
            }
        }
        config
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
