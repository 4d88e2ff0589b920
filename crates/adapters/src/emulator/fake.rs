// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake terminal adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use t3270_core::AidKey;

use super::{EmulatorError, TerminalAdapter};

/// Recorded terminal call
#[derive(Debug, Clone, PartialEq)]
pub enum TerminalCall {
    Rebind {
        host: String,
        port: u16,
        script_port: u16,
    },
    Connect,
    Disconnect,
    FillString {
        row: u16,
        column: u16,
        text: String,
    },
    SetString {
        text: String,
    },
    GetValue {
        row: u16,
        column: u16,
        length: u16,
    },
    Press {
        key: AidKey,
    },
    WaitForField,
    Rows,
    Columns,
    ScreenContents,
}

struct FakeTerminalState {
    calls: Vec<TerminalCall>,
    screen_values: HashMap<(u16, u16), String>,
    screen_lines: Vec<String>,
    connected: bool,
    connect_fails: bool,
    keyboard_locked: bool,
    fail: HashMap<String, String>,
    connects: usize,
}

/// Fake terminal adapter for testing
#[derive(Clone)]
pub struct FakeTerminal {
    inner: Arc<Mutex<FakeTerminalState>>,
}

impl Default for FakeTerminal {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeTerminalState {
                calls: Vec::new(),
                screen_values: HashMap::new(),
                screen_lines: Vec::new(),
                connected: false,
                connect_fails: false,
                keyboard_locked: false,
                fail: HashMap::new(),
                connects: 0,
            })),
        }
    }
}

impl FakeTerminal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<TerminalCall> {
        self.inner.lock().calls.clone()
    }

    /// Scripted value returned by `get_value` at 1-based `(row, column)`
    pub fn set_screen_value(&self, row: u16, column: u16, value: &str) {
        self.inner
            .lock()
            .screen_values
            .insert((row, column), value.to_string());
    }

    /// Scripted lines returned by `screen_contents`
    pub fn set_screen_lines(&self, lines: Vec<String>) {
        self.inner.lock().screen_lines = lines;
    }

    /// Make every `connect` fail with a connect timeout
    pub fn set_connect_fails(&self, fails: bool) {
        self.inner.lock().connect_fails = fails;
    }

    /// Make `wait_for_field` report a locked keyboard
    pub fn set_keyboard_locked(&self, locked: bool) {
        self.inner.lock().keyboard_locked = locked;
    }

    /// Fail an operation (`"FillString"`, `"Press"`, ...) with a message
    pub fn fail_operation(&self, operation: &str, message: &str) {
        self.inner
            .lock()
            .fail
            .insert(operation.to_string(), message.to_string());
    }

    pub fn is_connected(&self) -> bool {
        self.inner.lock().connected
    }

    /// How many times `connect` was called
    pub fn connect_count(&self) -> usize {
        self.inner.lock().connects
    }

    fn check_fail(&self, operation: &str) -> Result<(), EmulatorError> {
        if let Some(message) = self.inner.lock().fail.get(operation) {
            return Err(EmulatorError::CommandFailed(message.clone()));
        }
        Ok(())
    }
}

#[async_trait]
impl TerminalAdapter for FakeTerminal {
    async fn rebind(&self, host: &str, port: u16, script_port: u16) {
        self.inner.lock().calls.push(TerminalCall::Rebind {
            host: host.to_string(),
            port,
            script_port,
        });
    }

    async fn connect(&self) -> Result<(), EmulatorError> {
        let mut inner = self.inner.lock();
        inner.calls.push(TerminalCall::Connect);
        inner.connects += 1;
        if inner.connect_fails {
            return Err(EmulatorError::ConnectTimeout("fake".to_string()));
        }
        inner.connected = true;
        Ok(())
    }

    async fn disconnect(&self) {
        let mut inner = self.inner.lock();
        inner.calls.push(TerminalCall::Disconnect);
        inner.connected = false;
    }

    async fn fill_string(&self, row: u16, column: u16, text: &str) -> Result<(), EmulatorError> {
        self.inner.lock().calls.push(TerminalCall::FillString {
            row,
            column,
            text: text.to_string(),
        });
        self.check_fail("FillString")
    }

    async fn set_string(&self, text: &str) -> Result<(), EmulatorError> {
        self.inner.lock().calls.push(TerminalCall::SetString {
            text: text.to_string(),
        });
        self.check_fail("SetString")
    }

    async fn get_value(
        &self,
        row: u16,
        column: u16,
        length: u16,
    ) -> Result<String, EmulatorError> {
        let mut inner = self.inner.lock();
        inner.calls.push(TerminalCall::GetValue {
            row,
            column,
            length,
        });
        if let Some(message) = inner.fail.get("GetValue") {
            return Err(EmulatorError::CommandFailed(message.clone()));
        }
        Ok(inner
            .screen_values
            .get(&(row, column))
            .cloned()
            .unwrap_or_default())
    }

    async fn press(&self, key: AidKey) -> Result<(), EmulatorError> {
        self.inner.lock().calls.push(TerminalCall::Press { key });
        self.check_fail("Press")
    }

    async fn wait_for_field(&self, _timeout: Duration) -> Result<(), EmulatorError> {
        let mut inner = self.inner.lock();
        inner.calls.push(TerminalCall::WaitForField);
        if inner.keyboard_locked {
            return Err(EmulatorError::KeyboardLocked("L".to_string()));
        }
        Ok(())
    }

    async fn rows(&self) -> Result<u16, EmulatorError> {
        self.inner.lock().calls.push(TerminalCall::Rows);
        Ok(24)
    }

    async fn columns(&self) -> Result<u16, EmulatorError> {
        self.inner.lock().calls.push(TerminalCall::Columns);
        Ok(80)
    }

    async fn screen_contents(&self) -> Result<Vec<String>, EmulatorError> {
        let mut inner = self.inner.lock();
        inner.calls.push(TerminalCall::ScreenContents);
        if let Some(message) = inner.fail.get("ScreenContents") {
            return Err(EmulatorError::CommandFailed(message.clone()));
        }
        Ok(inner.screen_lines.clone())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
