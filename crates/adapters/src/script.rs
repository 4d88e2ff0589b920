// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line-oriented client for the emulator's script port.
//!
//! One request is a single text command terminated by `\n`; the response is
//! zero or more lines followed by a terminator line of `ok` or
//! `error <message>`. Screen data lines carry a `data:` prefix.

use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

/// Timeout for dialing the script port.
pub const DIAL_TIMEOUT: Duration = Duration::from_secs(5);

/// Deadline applied separately to the write and the read of each exchange.
pub const EXCHANGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from script-port exchanges.
///
/// `Transport` means the connection itself failed (dial, write, EOF,
/// deadline) and the command may be retried on a fresh connection. `Command`
/// is the emulator's own `error ...` terminator and is never retried at the
/// transport layer.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("script port transport: {0}")]
    Transport(String),
    #[error("{0}")]
    Command(String),
}

impl ScriptError {
    pub fn is_transport(&self) -> bool {
        matches!(self, ScriptError::Transport(_))
    }
}

/// A parsed script-port response: every line before the `ok` terminator.
#[derive(Debug, Clone, Default)]
pub struct ScriptResponse {
    pub lines: Vec<String>,
}

impl ScriptResponse {
    /// Screen data lines with the `data:` prefix stripped and trimmed.
    pub fn data_lines(&self) -> Vec<String> {
        self.lines
            .iter()
            .filter_map(|l| l.strip_prefix("data:"))
            .map(|l| l.trim().to_string())
            .collect()
    }

    /// The first data line, trimmed.
    pub fn first_data(&self) -> Option<String> {
        self.data_lines().into_iter().next()
    }

    /// All data lines joined with newlines and trimmed.
    pub fn data_text(&self) -> String {
        self.data_lines().join("\n").trim().to_string()
    }

    /// The first whitespace-separated field of the status line (the last
    /// non-data line before the terminator).
    pub fn status_field(&self) -> Option<&str> {
        self.lines
            .iter()
            .rev()
            .find(|l| !l.starts_with("data:"))
            .and_then(|l| l.split_whitespace().next())
    }
}

/// One persistent TCP connection to `127.0.0.1:<script_port>`.
///
/// The connection is dialed lazily and recreated on demand after transport
/// failures. [`ScriptConnection::execute`] performs exactly one transparent
/// retry on a fresh connection when the failure was transport-level.
#[derive(Debug)]
pub struct ScriptConnection {
    port: u16,
    stream: Option<BufReader<TcpStream>>,
}

impl ScriptConnection {
    pub fn new(port: u16) -> Self {
        ScriptConnection { port, stream: None }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Point at a different script port, dropping any open connection.
    pub fn set_port(&mut self, port: u16) {
        self.close();
        self.port = port;
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    pub fn close(&mut self) {
        self.stream = None;
    }

    /// Send one command and read its response.
    ///
    /// Transport failures get one silent retry with a freshly dialed
    /// connection; a second failure, or any `error ...` terminator, is
    /// returned to the caller.
    pub async fn execute(&mut self, command: &str) -> Result<ScriptResponse, ScriptError> {
        match self.execute_once(command).await {
            Err(e) if e.is_transport() => {
                tracing::debug!(port = self.port, command, error = %e, "transport fault, redialing");
                self.close();
                self.execute_once(command).await
            }
            other => other,
        }
    }

    /// One exchange. On transport failure the stream is dropped, so the
    /// next attempt starts from a fresh dial.
    async fn execute_once(&mut self, command: &str) -> Result<ScriptResponse, ScriptError> {
        let mut stream = match self.stream.take() {
            Some(stream) => stream,
            None => self.dial().await?,
        };

        let mut line = command.to_string();
        line.push('\n');
        match tokio::time::timeout(EXCHANGE_TIMEOUT, stream.write_all(line.as_bytes())).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(ScriptError::Transport(format!("write: {}", e))),
            Err(_) => return Err(ScriptError::Transport("write deadline elapsed".to_string())),
        }

        match tokio::time::timeout(EXCHANGE_TIMEOUT, read_response(&mut stream)).await {
            Ok(Ok(Ok(response))) => {
                self.stream = Some(stream);
                Ok(response)
            }
            // A semantic `error` terminator completed the exchange; the
            // connection stays usable.
            Ok(Ok(Err(command_err))) => {
                self.stream = Some(stream);
                Err(command_err)
            }
            Ok(Err(e)) => Err(ScriptError::Transport(format!("read: {}", e))),
            Err(_) => Err(ScriptError::Transport("read deadline elapsed".to_string())),
        }
    }

    async fn dial(&self) -> Result<BufReader<TcpStream>, ScriptError> {
        let addr = format!("127.0.0.1:{}", self.port);
        match tokio::time::timeout(DIAL_TIMEOUT, TcpStream::connect(&addr)).await {
            Ok(Ok(stream)) => Ok(BufReader::new(stream)),
            Ok(Err(e)) => Err(ScriptError::Transport(format!("dial {}: {}", addr, e))),
            Err(_) => Err(ScriptError::Transport(format!("dial {}: timed out", addr))),
        }
    }
}

/// Read lines until an `ok` or `error` terminator.
///
/// `Ok(Ok(..))` is a complete response, `Ok(Err(..))` a semantic failure
/// from an `error` terminator; the outer `io::Error` is a transport fault.
async fn read_response(
    stream: &mut BufReader<TcpStream>,
) -> std::io::Result<Result<ScriptResponse, ScriptError>> {
    let mut response = ScriptResponse::default();
    loop {
        let mut line = String::new();
        let n = stream.read_line(&mut line).await?;
        if n == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "script port closed mid-response",
            ));
        }
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed == "ok" {
            return Ok(Ok(response));
        }
        if let Some(message) = trimmed.strip_prefix("error") {
            return Ok(Err(ScriptError::Command(message.trim().to_string())));
        }
        response.lines.push(trimmed.to_string());
    }
}

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use fake_server::FakeScriptServer;

#[cfg(any(test, feature = "test-support"))]
#[path = "script_server.rs"]
mod fake_server;

#[cfg(test)]
#[path = "script_tests.rs"]
mod tests;
