// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The real terminal adapter driving an x3270-family emulator.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use t3270_core::{AidKey, ShutdownSignal};

use super::{
    EmulatorError, EmulatorProcess, TerminalAdapter, COMMAND_ATTEMPTS, COMMAND_RETRY_DELAY,
    CONNECT_ATTEMPTS, CONNECT_RETRY_DELAY, STATE_POLL_ATTEMPTS, STATE_POLL_INTERVAL,
};
use crate::script::{ScriptConnection, ScriptError, ScriptResponse};

struct Inner {
    host: String,
    port: u16,
    conn: ScriptConnection,
    process: Option<EmulatorProcess>,
    connected: bool,
}

/// Adapter over one emulator subprocess and its script port.
///
/// All operations are serialized behind one internal mutex, so no two
/// command exchanges overlap on the script connection. The subprocess is
/// spawned on first [`connect`](TerminalAdapter::connect) and respawned as
/// needed after teardown.
pub struct S3270Adapter {
    headless: bool,
    manage_process: bool,
    shutdown: ShutdownSignal,
    inner: Mutex<Inner>,
}

impl S3270Adapter {
    /// An adapter that owns its emulator subprocess.
    pub fn new(headless: bool, shutdown: ShutdownSignal) -> Self {
        S3270Adapter {
            headless,
            manage_process: true,
            shutdown,
            inner: Mutex::new(Inner {
                host: String::new(),
                port: 0,
                conn: ScriptConnection::new(0),
                process: None,
                connected: false,
            }),
        }
    }

    /// Drive an already-running emulator's script port without spawning.
    pub fn attach(script_port: u16, shutdown: ShutdownSignal) -> Self {
        S3270Adapter {
            headless: true,
            manage_process: false,
            shutdown,
            inner: Mutex::new(Inner {
                host: String::new(),
                port: 0,
                conn: ScriptConnection::new(script_port),
                process: None,
                connected: false,
            }),
        }
    }

    /// Kill the subprocess (if owned) and drop the script connection.
    async fn teardown(inner: &mut Inner) {
        if let Some(mut process) = inner.process.take() {
            process.kill().await;
        }
        inner.conn.close();
        inner.connected = false;
    }

    /// One connect attempt: ensure the subprocess, then poll the connection
    /// state until the emulator reports a host session.
    async fn try_connect(&self, inner: &mut Inner, target: &str) -> Result<(), EmulatorError> {
        if self.manage_process && inner.process.is_none() {
            let script_port = inner.conn.port();
            inner.process = Some(EmulatorProcess::spawn(
                &inner.host,
                inner.port,
                script_port,
                self.headless,
            )?);
        }

        if !self.manage_process {
            // An attached emulator was not told its host on the command line.
            inner
                .conn
                .execute(&format!("Connect({})", target))
                .await
                .map_err(map_script)?;
        }

        for _ in 0..STATE_POLL_ATTEMPTS {
            if self.shutdown.is_requested() {
                return Err(EmulatorError::ShutdownRequested);
            }
            match inner.conn.execute("Query(ConnectionState)").await {
                Ok(response) => {
                    let state = response.first_data().unwrap_or_default();
                    if state.starts_with("C(") {
                        return Ok(());
                    }
                }
                // The script port may not be listening yet right after spawn.
                Err(e) => tracing::trace!(error = %e, "connection state poll failed"),
            }
            tokio::time::sleep(STATE_POLL_INTERVAL).await;
        }
        Err(EmulatorError::ConnectTimeout(target.to_string()))
    }

    /// Run one command with the standard retry policy: up to
    /// [`COMMAND_ATTEMPTS`] attempts at 1 s intervals, closing and redialing
    /// the script connection between attempts.
    async fn command(&self, inner: &mut Inner, cmd: &str) -> Result<ScriptResponse, EmulatorError> {
        let mut last: Option<ScriptError> = None;
        for attempt in 1..=COMMAND_ATTEMPTS {
            match inner.conn.execute(cmd).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    tracing::debug!(attempt, command = cmd, error = %e, "command attempt failed");
                    inner.conn.close();
                    last = Some(e);
                    if attempt < COMMAND_ATTEMPTS {
                        tokio::time::sleep(COMMAND_RETRY_DELAY).await;
                    }
                }
            }
        }
        Err(EmulatorError::CommandFailed(
            last.map(|e| e.to_string()).unwrap_or_default(),
        ))
    }

    /// Run a `Snap(..)` query and parse its single numeric data line,
    /// retrying malformed responses alongside failed ones.
    async fn snap_number(&self, inner: &mut Inner, cmd: &str) -> Result<u16, EmulatorError> {
        let mut last = String::new();
        for attempt in 1..=COMMAND_ATTEMPTS {
            match inner.conn.execute(cmd).await {
                Ok(response) => {
                    let text = response.first_data().unwrap_or_default();
                    if let Ok(n) = text.parse::<u16>() {
                        return Ok(n);
                    }
                    last = format!("non-numeric response: {:?}", text);
                }
                Err(e) => {
                    inner.conn.close();
                    last = e.to_string();
                }
            }
            if attempt < COMMAND_ATTEMPTS {
                tokio::time::sleep(COMMAND_RETRY_DELAY).await;
            }
        }
        Err(EmulatorError::CommandFailed(last))
    }
}

fn map_script(e: ScriptError) -> EmulatorError {
    EmulatorError::CommandFailed(e.to_string())
}

#[async_trait]
impl TerminalAdapter for S3270Adapter {
    async fn rebind(&self, host: &str, port: u16, script_port: u16) {
        let mut inner = self.inner.lock().await;
        inner.host = host.to_string();
        inner.port = port;
        if self.manage_process {
            inner.conn.set_port(script_port);
        }
    }

    async fn connect(&self) -> Result<(), EmulatorError> {
        let mut inner = self.inner.lock().await;
        if inner.host.is_empty() {
            return Err(EmulatorError::HostEmpty);
        }
        let target = format!("{}:{}", inner.host, inner.port);

        let mut last = EmulatorError::ConnectTimeout(target.clone());
        for attempt in 1..=CONNECT_ATTEMPTS {
            if self.shutdown.is_requested() {
                return Err(EmulatorError::ShutdownRequested);
            }
            match self.try_connect(&mut inner, &target).await {
                Ok(()) => {
                    inner.connected = true;
                    return Ok(());
                }
                Err(e) if e.is_shutdown() => return Err(e),
                Err(e) => {
                    tracing::warn!(attempt, target = %target, error = %e, "connect attempt failed");
                    Self::teardown(&mut inner).await;
                    last = e;
                    if attempt < CONNECT_ATTEMPTS {
                        tokio::time::sleep(CONNECT_RETRY_DELAY).await;
                    }
                }
            }
        }
        Err(last)
    }

    async fn disconnect(&self) {
        let mut inner = self.inner.lock().await;
        if inner.connected {
            if let Err(e) = inner.conn.execute("Quit").await {
                tracing::debug!(error = %e, "quit on disconnect failed");
            }
        }
        Self::teardown(&mut inner).await;
    }

    async fn fill_string(&self, row: u16, column: u16, text: &str) -> Result<(), EmulatorError> {
        let mut inner = self.inner.lock().await;
        let move_cmd = format!("MoveCursor({},{})", row.saturating_sub(1), column.saturating_sub(1));
        let string_cmd = format!("String({})", text);

        let mut last = String::new();
        for attempt in 1..=COMMAND_ATTEMPTS {
            let result = match inner.conn.execute(&move_cmd).await {
                Ok(_) => inner.conn.execute(&string_cmd).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(_) => return Ok(()),
                Err(e) => {
                    tracing::debug!(attempt, row, column, error = %e, "fill attempt failed");
                    inner.conn.close();
                    last = e.to_string();
                    if attempt < COMMAND_ATTEMPTS {
                        tokio::time::sleep(COMMAND_RETRY_DELAY).await;
                    }
                }
            }
        }
        Err(EmulatorError::CommandFailed(last))
    }

    async fn set_string(&self, text: &str) -> Result<(), EmulatorError> {
        let mut inner = self.inner.lock().await;
        self.command(&mut inner, &format!("String({})", text))
            .await?;
        Ok(())
    }

    async fn get_value(
        &self,
        row: u16,
        column: u16,
        length: u16,
    ) -> Result<String, EmulatorError> {
        let mut inner = self.inner.lock().await;
        let cmd = format!(
            "Ascii({},{},{})",
            row.saturating_sub(1),
            column.saturating_sub(1),
            length
        );
        let response = self.command(&mut inner, &cmd).await?;
        Ok(response.data_text())
    }

    async fn press(&self, key: AidKey) -> Result<(), EmulatorError> {
        let mut inner = self.inner.lock().await;
        self.command(&mut inner, &key.command()).await?;
        Ok(())
    }

    async fn wait_for_field(&self, timeout: Duration) -> Result<(), EmulatorError> {
        let mut inner = self.inner.lock().await;
        let secs = timeout.as_secs().max(1);
        let response = self
            .command(&mut inner, &format!("Wait({},InputField)", secs))
            .await?;
        match response.status_field() {
            Some("U") => Ok(()),
            Some(state) => Err(EmulatorError::KeyboardLocked(state.to_string())),
            None => Err(EmulatorError::CommandFailed(
                "wait returned no status line".to_string(),
            )),
        }
    }

    async fn rows(&self) -> Result<u16, EmulatorError> {
        let mut inner = self.inner.lock().await;
        self.snap_number(&mut inner, "Snap(Rows)").await
    }

    async fn columns(&self) -> Result<u16, EmulatorError> {
        let mut inner = self.inner.lock().await;
        self.snap_number(&mut inner, "Snap(Cols)").await
    }

    async fn screen_contents(&self) -> Result<Vec<String>, EmulatorError> {
        let mut inner = self.inner.lock().await;
        let response = self.command(&mut inner, "Ascii()").await?;
        Ok(response.data_lines())
    }
}

#[cfg(test)]
#[path = "s3270_tests.rs"]
mod tests;
