// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted in-process stand-in for an emulator's script port.
#![cfg_attr(coverage_nightly, coverage(off))]

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

struct ServerState {
    screen_values: HashMap<(u16, u16), String>,
    screen_lines: Vec<String>,
    keyboard: String,
    connected: bool,
    received: Vec<String>,
    fail: HashMap<String, String>,
    drop_before_reply: bool,
    connections: u32,
}

impl Default for ServerState {
    fn default() -> Self {
        ServerState {
            screen_values: HashMap::new(),
            screen_lines: Vec::new(),
            keyboard: "U".to_string(),
            connected: false,
            received: Vec::new(),
            fail: HashMap::new(),
            drop_before_reply: false,
            connections: 0,
        }
    }
}

/// A TCP server speaking the emulator script-port protocol, with scripted
/// screen contents and failure injection. Accepts reconnections, so
/// transport-recovery paths can be exercised.
pub struct FakeScriptServer {
    port: u16,
    state: Arc<Mutex<ServerState>>,
    accept_task: tokio::task::JoinHandle<()>,
}

impl FakeScriptServer {
    /// Bind an ephemeral local port and start serving.
    pub async fn spawn() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();
        let state = Arc::new(Mutex::new(ServerState::default()));

        let accept_state = Arc::clone(&state);
        let accept_task = tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    break;
                };
                accept_state.lock().connections += 1;
                serve_connection(socket, Arc::clone(&accept_state)).await;
            }
        });

        Ok(FakeScriptServer {
            port,
            state,
            accept_task,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Value returned for `Ascii(row,col,len)` at zero-based `(row, col)`.
    pub fn set_screen_value(&self, row: u16, col: u16, value: &str) {
        self.state
            .lock()
            .screen_values
            .insert((row, col), value.to_string());
    }

    /// Full-screen lines returned for `Ascii()`.
    pub fn set_screen_lines(&self, lines: Vec<String>) {
        self.state.lock().screen_lines = lines;
    }

    /// Keyboard state token reported on status lines (`"U"` unlocked).
    pub fn set_keyboard(&self, token: &str) {
        self.state.lock().keyboard = token.to_string();
    }

    /// Respond `error <message>` to commands starting with `prefix`.
    pub fn fail_command(&self, prefix: &str, message: &str) {
        self.state
            .lock()
            .fail
            .insert(prefix.to_string(), message.to_string());
    }

    pub fn clear_failure(&self, prefix: &str) {
        self.state.lock().fail.remove(prefix);
    }

    /// Close the connection instead of replying to the next command.
    pub fn drop_connection_before_next_reply(&self) {
        self.state.lock().drop_before_reply = true;
    }

    /// Every command line received, in order.
    pub fn received(&self) -> Vec<String> {
        self.state.lock().received.clone()
    }

    /// How many connections have been accepted.
    pub fn connection_count(&self) -> u32 {
        self.state.lock().connections
    }
}

impl Drop for FakeScriptServer {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}

async fn serve_connection(socket: TcpStream, state: Arc<Mutex<ServerState>>) {
    let mut stream = BufReader::new(socket);
    loop {
        let mut line = String::new();
        match stream.read_line(&mut line).await {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }
        let command = line.trim().to_string();

        let reply = {
            let mut state = state.lock();
            state.received.push(command.clone());
            if state.drop_before_reply {
                state.drop_before_reply = false;
                return;
            }
            respond(&mut state, &command)
        };

        let Some(reply) = reply else {
            // Quit: acknowledge, then close.
            let _ = stream.write_all(b"ok\n").await;
            return;
        };
        if stream.write_all(reply.as_bytes()).await.is_err() {
            return;
        }
    }
}

/// Build the full response text for one command; `None` means "ok then
/// close" (Quit).
fn respond(state: &mut ServerState, command: &str) -> Option<String> {
    for (prefix, message) in &state.fail {
        if command.starts_with(prefix.as_str()) {
            return Some(format!("error {}\n", message));
        }
    }

    let status = format!("{} F U C(fake) I 4 24 80 0 0 0x0 -\n", state.keyboard);
    let mut out = String::new();

    if command.starts_with("Connect(") {
        state.connected = true;
    } else if command == "Disconnect" {
        state.connected = false;
    } else if command == "Quit" {
        return None;
    } else if command == "Ascii()" {
        for line in &state.screen_lines {
            out.push_str(&format!("data: {}\n", line));
        }
    } else if let Some(args) = command.strip_prefix("Ascii(") {
        let coords: Vec<u16> = args
            .trim_end_matches(')')
            .split(',')
            .filter_map(|p| p.trim().parse().ok())
            .collect();
        if let [row, col, _len] = coords[..] {
            if let Some(value) = state.screen_values.get(&(row, col)) {
                out.push_str(&format!("data: {}\n", value));
            } else {
                out.push_str("data: \n");
            }
        }
    } else if command == "Snap(Rows)" {
        out.push_str("data: 24\n");
    } else if command == "Snap(Cols)" {
        out.push_str("data: 80\n");
    } else if command == "Query(ConnectionState)" {
        if state.connected {
            out.push_str("data: C(fake)\n");
        } else {
            out.push_str("data: N\n");
        }
    } else if command.starts_with("String(")
        || command.starts_with("MoveCursor(")
        || command.starts_with("Wait(")
        || command == "Enter"
        || command == "Tab"
        || command.starts_with("PF(")
        || command.starts_with("Query(")
    {
        // Acknowledged below with the shared status line.
    } else {
        return Some(format!("error unknown command: {}\n", command));
    }

    out.push_str(&status);
    out.push_str("ok\n");
    Some(out)
}
