// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::sync::test_helpers::MockTransport;
use serde_json::{json, Value};

fn rec(value: Value) -> Record {
    value.as_object().unwrap().clone()
}

fn remote(transport: &MockTransport) -> WebSocketRemote<MockTransport> {
    WebSocketRemote::with_transport("ws://mock", Duration::from_millis(200), transport.clone())
}

/// Answers every request with the given reply.
fn replying(reply: Reply) -> MockTransport {
    MockTransport::responding(move |msg| match msg {
        ClientMessage::Request { id, .. } => Some(ServerMessage::response(*id, reply.clone())),
        ClientMessage::Ping { id } => Some(ServerMessage::pong(*id)),
    })
}

#[tokio::test]
async fn insert_returns_the_remote_record() {
    let stored = rec(json!({"id": "u1", "nom": "Famille X", "created_at": "t"}));
    let transport = replying(Reply::Inserted {
        record: stored.clone(),
    });
    let remote = remote(&transport);

    let got = remote
        .insert(Table::Participants, rec(json!({"id": "u1", "nom": "Famille X"})))
        .await
        .unwrap();
    assert_eq!(got, stored);

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    let ClientMessage::Request { op, .. } = &sent[0] else {
        unreachable!()
    };
    assert_eq!(op.table_name(), "participants");
}

#[tokio::test]
async fn connection_is_established_once_and_reused() {
    let transport = replying(Reply::Updated);
    let remote = remote(&transport);
    for _ in 0..3 {
        remote
            .update(Table::Sessions, "s1".into(), Record::new())
            .await
            .unwrap();
    }
    assert_eq!(transport.connects(), 1);

    let ids: Vec<u64> = transport
        .sent()
        .iter()
        .map(|m| match m {
            ClientMessage::Request { id, .. } | ClientMessage::Ping { id } => *id,
        })
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn failures_map_to_remote_errors() {
    let conflict = remote(&replying(Reply::failed(FailureKind::Conflict, "dup")));
    let err = conflict
        .insert(Table::Participants, Record::new())
        .await
        .unwrap_err();
    assert!(err.is_conflict());

    let missing = remote(&replying(Reply::failed(FailureKind::NotFound, "gone")));
    let err = missing
        .delete(Table::Participants, "u1".into())
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let rejected = remote(&replying(Reply::failed(FailureKind::Rejected, "bad column")));
    let err = rejected
        .select(Table::Participants, Filter::new(), None)
        .await
        .unwrap_err();
    assert_eq!(err, RemoteError::Rejected("bad column".into()));
}

#[tokio::test]
async fn mismatched_reply_is_a_protocol_error() {
    let remote = remote(&replying(Reply::Deleted));
    let err = remote
        .select(Table::Sessions, Filter::new(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Protocol(_)));
}

#[tokio::test]
async fn stale_responses_are_skipped() {
    let transport = replying(Reply::Rows {
        records: vec![rec(json!({"id": "s1"}))],
    });
    transport.push_frame(
        ServerMessage::response(999, Reply::Deleted)
            .to_json()
            .unwrap(),
    );
    let remote = remote(&transport);
    let rows = remote
        .select(Table::Sessions, Filter::new(), Some(Sort::desc("date_debut")))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn silent_remote_times_out_and_drops_connection() {
    let transport = MockTransport::new();
    let remote = remote(&transport);
    let err = remote
        .delete(Table::Personnes, "p1".into())
        .await
        .unwrap_err();
    assert_eq!(err, RemoteError::Timeout(200));
    assert!(!transport.connected());
}

#[tokio::test]
async fn server_error_drops_connection_and_next_call_reconnects() {
    let transport = MockTransport::responding(|msg| match msg {
        ClientMessage::Request { id: 1, .. } => Some(ServerMessage::error("malformed request")),
        ClientMessage::Request { id, .. } => Some(ServerMessage::response(*id, Reply::Updated)),
        ClientMessage::Ping { .. } => None,
    });
    let remote = remote(&transport);

    let err = remote
        .update(Table::Participants, "u1".into(), Record::new())
        .await
        .unwrap_err();
    assert_eq!(err, RemoteError::Protocol("malformed request".into()));

    remote
        .update(Table::Participants, "u1".into(), Record::new())
        .await
        .unwrap();
    assert_eq!(transport.connects(), 2);
}

#[tokio::test]
async fn connect_failure_is_unavailable() {
    let transport = replying(Reply::Updated);
    transport.set_connect_fail(true);
    let err = remote(&transport)
        .update(Table::Participants, "u1".into(), Record::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Unavailable(_)));
}

#[tokio::test]
async fn no_remote_is_always_unavailable() {
    let err = NoRemote
        .select(Table::Participants, Filter::new(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Unavailable(_)));
}
