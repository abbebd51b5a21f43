// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket protocol between the client and the remote backend.
//!
//! One JSON text frame per message:
//! - Client sends a `request` carrying one table operation, or a `ping`
//! - Server answers each request with a `response` echoing its id
//!
//! Tables are named by their remote names (`sessions_messianisme`, ...).

use serde::{Deserialize, Serialize};

use crate::query::{Filter, Sort};
use crate::record::Record;
use crate::schema::Table;

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// A table operation. The server answers with a `Response` carrying
    /// the same id.
    Request {
        /// Client-chosen correlation id.
        id: u64,
        op: RemoteOp,
    },

    /// Ping message for keepalive and reachability checks.
    Ping {
        /// Client-chosen ID echoed in Pong.
        id: u64,
    },
}

/// One operation against a remote table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RemoteOp {
    /// Insert a new record; fails with `conflict` if the id exists.
    Insert { table: String, record: Record },

    /// Merge `patch` into the record with this id.
    Update {
        table: String,
        id: String,
        patch: Record,
    },

    /// Delete the record with this id.
    Delete { table: String, id: String },

    /// Equality-filtered, optionally ordered read.
    Select {
        table: String,
        #[serde(default)]
        filter: Filter,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        order: Option<Sort>,
    },
}

impl RemoteOp {
    pub fn insert(table: Table, record: Record) -> Self {
        RemoteOp::Insert {
            table: table.remote_name().to_string(),
            record,
        }
    }

    pub fn update(table: Table, id: impl Into<String>, patch: Record) -> Self {
        RemoteOp::Update {
            table: table.remote_name().to_string(),
            id: id.into(),
            patch,
        }
    }

    pub fn delete(table: Table, id: impl Into<String>) -> Self {
        RemoteOp::Delete {
            table: table.remote_name().to_string(),
            id: id.into(),
        }
    }

    pub fn select(table: Table, filter: Filter, order: Option<Sort>) -> Self {
        RemoteOp::Select {
            table: table.remote_name().to_string(),
            filter,
            order,
        }
    }

    /// Remote table name the operation targets.
    pub fn table_name(&self) -> &str {
        match self {
            RemoteOp::Insert { table, .. }
            | RemoteOp::Update { table, .. }
            | RemoteOp::Delete { table, .. }
            | RemoteOp::Select { table, .. } => table,
        }
    }
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Answer to a `Request`.
    Response {
        /// Echoed from the request.
        id: u64,
        reply: Reply,
    },

    /// Pong response to client Ping.
    Pong {
        /// Echoed from the Ping message.
        id: u64,
    },

    /// Error not tied to a request (e.g. an unparseable frame).
    Error {
        /// Human-readable error description.
        message: String,
    },
}

/// Outcome of one remote operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Reply {
    /// The stored record, as the remote now holds it.
    Inserted { record: Record },
    Updated,
    Deleted,
    Rows { records: Vec<Record> },
    Failed { kind: FailureKind, message: String },
}

/// Why the remote refused an operation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A record with that id already exists.
    Conflict,
    NotFound,
    /// Invalid table, column or value.
    Rejected,
}

impl Reply {
    pub fn failed(kind: FailureKind, message: impl Into<String>) -> Self {
        Reply::Failed {
            kind,
            message: message.into(),
        }
    }
}

impl ClientMessage {
    /// Creates a Request message.
    pub fn request(id: u64, op: RemoteOp) -> Self {
        ClientMessage::Request { id, op }
    }

    /// Creates a Ping message.
    pub fn ping(id: u64) -> Self {
        ClientMessage::Ping { id }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    /// Creates a Response message.
    pub fn response(id: u64, reply: Reply) -> Self {
        ServerMessage::Response { id, reply }
    }

    /// Creates a Pong message.
    pub fn pong(id: u64) -> Self {
        ServerMessage::Pong { id }
    }

    /// Creates an Error message.
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
