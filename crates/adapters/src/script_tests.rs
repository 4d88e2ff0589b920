// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{FakeScriptServer, ScriptConnection, ScriptError, ScriptResponse};

#[tokio::test]
async fn executes_a_command_and_parses_data_lines() {
    let server = FakeScriptServer::spawn().await.unwrap();
    server.set_screen_value(0, 1, "ACTUAL");
    let mut conn = ScriptConnection::new(server.port());

    let response = conn.execute("Ascii(0,1,11)").await.unwrap();
    assert_eq!(response.first_data().unwrap(), "ACTUAL");
    assert_eq!(server.received(), vec!["Ascii(0,1,11)".to_string()]);
}

#[tokio::test]
async fn error_terminator_is_a_command_error() {
    let server = FakeScriptServer::spawn().await.unwrap();
    server.fail_command("String(", "keyboard locked");
    let mut conn = ScriptConnection::new(server.port());

    let err = conn.execute("String(hello)").await.err().unwrap();
    assert!(matches!(err, ScriptError::Command(ref m) if m == "keyboard locked"));
    // Semantic failures are not retried at the transport layer.
    assert_eq!(server.received().len(), 1);
}

#[tokio::test]
async fn transport_fault_gets_exactly_one_silent_retry() {
    let server = FakeScriptServer::spawn().await.unwrap();
    let mut conn = ScriptConnection::new(server.port());

    conn.execute("Query(ConnectionState)").await.unwrap();
    assert_eq!(server.connection_count(), 1);

    // The server hangs up instead of replying; the client must redial and
    // resend without surfacing an error.
    server.drop_connection_before_next_reply();
    let response = conn.execute("Snap(Rows)").await.unwrap();
    assert_eq!(response.first_data().unwrap(), "24");
    assert_eq!(server.connection_count(), 2);

    let received = server.received();
    assert_eq!(
        received,
        vec![
            "Query(ConnectionState)".to_string(),
            "Snap(Rows)".to_string(),
            "Snap(Rows)".to_string(),
        ]
    );
}

#[tokio::test]
async fn dial_failure_is_a_transport_error() {
    // Bind and drop to find a port nothing listens on.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let mut conn = ScriptConnection::new(port);
    let err = conn.execute("Enter").await.err().unwrap();
    assert!(err.is_transport());
}

#[tokio::test]
async fn set_port_drops_the_open_connection() {
    let server = FakeScriptServer::spawn().await.unwrap();
    let mut conn = ScriptConnection::new(server.port());
    conn.execute("Enter").await.unwrap();
    assert!(conn.is_open());

    conn.set_port(server.port());
    assert!(!conn.is_open());
    conn.execute("Tab").await.unwrap();
    assert_eq!(server.connection_count(), 2);
}

#[test]
fn response_helpers_strip_and_select() {
    let response = ScriptResponse {
        lines: vec![
            "data: first".to_string(),
            "data: second".to_string(),
            "U F U C(fake) I 4 24 80 0 0 0x0 -".to_string(),
        ],
    };
    assert_eq!(response.data_lines(), vec!["first", "second"]);
    assert_eq!(response.first_data().unwrap(), "first");
    assert_eq!(response.data_text(), "first\nsecond");
    assert_eq!(response.status_field(), Some("U"));
}

#[test]
fn status_field_of_a_data_only_response_is_none() {
    let response = ScriptResponse {
        lines: vec!["data: only".to_string()],
    };
    assert_eq!(response.status_field(), None);
}
