// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Injection tables: rotating `{{placeholder}}` values for released workflows.

use std::collections::HashMap;
use std::path::Path;

use crate::config::ConfigError;

/// Replace every `{{name}}` occurrence in `text` using `entry`.
pub fn apply(entry: &HashMap<String, String>, text: &str) -> String {
    let mut out = text.to_string();
    for (name, value) in entry {
        out = out.replace(&format!("{{{{{}}}}}", name), value);
    }
    out
}

/// An ordered, read-only table of placeholder entries.
///
/// Accepted JSON shapes: an array of objects, a single object, or an object
/// wrapping the array under `"entries"` or `"data"`. Scalar values are
/// coerced to strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InjectionTable {
    entries: Vec<HashMap<String, String>>,
}

impl InjectionTable {
    /// Load and coerce a table from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let value: serde_json::Value =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_value(value).map_err(|message| ConfigError::BadInjection {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Build a table from a parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, String> {
        let items = match value {
            serde_json::Value::Array(items) => items,
            serde_json::Value::Object(map) => {
                let wrapped = map.get("entries").or_else(|| map.get("data")).cloned();
                match wrapped {
                    Some(serde_json::Value::Array(items)) => items,
                    Some(other) => {
                        return Err(format!(
                            "expected an array under \"entries\"/\"data\", got {}",
                            kind_name(&other)
                        ));
                    }
                    // A bare object is a single entry.
                    None => vec![serde_json::Value::Object(map)],
                }
            }
            other => return Err(format!("expected an array or object, got {}", kind_name(&other))),
        };

        let mut entries = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            let serde_json::Value::Object(map) = item else {
                return Err(format!("entry {} is not an object", i));
            };
            let mut entry = HashMap::with_capacity(map.len());
            for (key, value) in map {
                let coerced = coerce(&value)
                    .ok_or_else(|| format!("entry {}: value for \"{}\" is not a scalar", i, key))?;
                entry.insert(key, coerced);
            }
            entries.push(entry);
        }
        Ok(InjectionTable { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry at `cursor` modulo the table length.
    pub fn entry(&self, cursor: usize) -> Option<&HashMap<String, String>> {
        if self.entries.is_empty() {
            None
        } else {
            self.entries.get(cursor % self.entries.len())
        }
    }

    /// A cycling cursor over the table.
    pub fn rotation(&self) -> Rotation<'_> {
        Rotation {
            table: self,
            cursor: 0,
        }
    }
}

/// Scheduler-local cursor; advances modulo the table length on each call.
#[derive(Debug)]
pub struct Rotation<'a> {
    table: &'a InjectionTable,
    cursor: usize,
}

impl Rotation<'_> {
    /// The next entry, or `None` for an empty table.
    pub fn next_entry(&mut self) -> Option<&HashMap<String, String>> {
        let entry = self.table.entry(self.cursor)?;
        self.cursor += 1;
        Some(entry)
    }
}

fn coerce(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        serde_json::Value::Null => Some(String::new()),
        _ => None,
    }
}

fn kind_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a bool",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[path = "injection_tests.rs"]
mod tests;
