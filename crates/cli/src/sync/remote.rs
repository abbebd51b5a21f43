// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client side of the remote backend contract.
//!
//! [`RemoteBackend`] is the fixed request/response surface the services
//! and the sync engine consume. [`WebSocketRemote`] implements it over the
//! JSON protocol in [`eq_core::protocol`].

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use eq_core::protocol::{ClientMessage, FailureKind, RemoteOp, Reply, ServerMessage};
use eq_core::{Filter, Record, Sort, Table};
use tokio::sync::Mutex;
use tracing::debug;

use super::transport::{Transport, TransportError, WebSocketTransport};

/// Why a remote call did not succeed.
///
/// Services treat every variant as "take the offline path"; the sync
/// engine distinguishes conflicts and missing records.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("remote unavailable: {0}")]
    Unavailable(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("rejected by remote: {0}")]
    Rejected(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("remote did not answer within {0}ms")]
    Timeout(u64),
}

impl RemoteError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, RemoteError::Conflict(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::NotFound(_))
    }

    fn from_failure(kind: FailureKind, message: String) -> Self {
        match kind {
            FailureKind::Conflict => RemoteError::Conflict(message),
            FailureKind::NotFound => RemoteError::NotFound(message),
            FailureKind::Rejected => RemoteError::Rejected(message),
        }
    }
}

impl From<TransportError> for RemoteError {
    fn from(e: TransportError) -> Self {
        RemoteError::Unavailable(e.to_string())
    }
}

/// Result type for remote calls.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Boxed future returned by [`RemoteBackend`] methods.
pub type RemoteFuture<'a, T> = Pin<Box<dyn Future<Output = RemoteResult<T>> + Send + 'a>>;

/// The authoritative datastore, per table.
pub trait RemoteBackend: Send + Sync {
    /// Inserts a record and returns it as the remote stored it.
    fn insert(&self, table: Table, record: Record) -> RemoteFuture<'_, Record>;

    /// Merges `patch` into the record with this id.
    fn update(&self, table: Table, id: String, patch: Record) -> RemoteFuture<'_, ()>;

    fn delete(&self, table: Table, id: String) -> RemoteFuture<'_, ()>;

    /// Equality-filtered read in the given order.
    fn select(
        &self,
        table: Table,
        filter: Filter,
        order: Option<Sort>,
    ) -> RemoteFuture<'_, Vec<Record>>;
}

/// Stand-in for devices with no remote configured: every call is
/// unavailable, so services always take the offline path.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRemote;

impl NoRemote {
    fn unavailable<T: Send + 'static>() -> RemoteFuture<'static, T> {
        Box::pin(async { Err(RemoteError::Unavailable("no remote configured".into())) })
    }
}

impl RemoteBackend for NoRemote {
    fn insert(&self, _table: Table, _record: Record) -> RemoteFuture<'_, Record> {
        Self::unavailable()
    }

    fn update(&self, _table: Table, _id: String, _patch: Record) -> RemoteFuture<'_, ()> {
        Self::unavailable()
    }

    fn delete(&self, _table: Table, _id: String) -> RemoteFuture<'_, ()> {
        Self::unavailable()
    }

    fn select(
        &self,
        _table: Table,
        _filter: Filter,
        _order: Option<Sort>,
    ) -> RemoteFuture<'_, Vec<Record>> {
        Self::unavailable()
    }
}

/// Remote backend reached over a WebSocket.
///
/// One connection is established lazily on the first call and reused.
/// Calls are serialized; each one is bounded by the request timeout and
/// any transport failure or timeout drops the connection so the next call
/// reconnects.
pub struct WebSocketRemote<T: Transport = WebSocketTransport> {
    url: String,
    timeout: Duration,
    transport: Mutex<T>,
    next_id: AtomicU64,
}

impl WebSocketRemote<WebSocketTransport> {
    pub fn connect_lazy(url: impl Into<String>, timeout: Duration) -> Self {
        Self::with_transport(url, timeout, WebSocketTransport::new())
    }
}

impl<T: Transport> WebSocketRemote<T> {
    pub fn with_transport(url: impl Into<String>, timeout: Duration, transport: T) -> Self {
        WebSocketRemote {
            url: url.into(),
            timeout,
            transport: Mutex::new(transport),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Sends one operation and waits for its reply.
    async fn call(&self, op: RemoteOp) -> RemoteResult<Reply> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut transport = self.transport.lock().await;
        let outcome =
            tokio::time::timeout(self.timeout, exchange(&mut *transport, &self.url, id, op)).await;
        let err = match outcome {
            Ok(Ok(reply)) => return Ok(reply),
            Ok(Err(e)) => e,
            Err(_) => RemoteError::Timeout(self.timeout.as_millis() as u64),
        };
        debug!(request = id, error = %err, "dropping remote connection");
        let _ = transport.disconnect().await;
        Err(err)
    }
}

async fn exchange<T: Transport>(
    transport: &mut T,
    url: &str,
    id: u64,
    op: RemoteOp,
) -> RemoteResult<Reply> {
    if !transport.is_connected() {
        transport.connect(url).await?;
        debug!(url, "connected to remote");
    }
    let frame = ClientMessage::request(id, op)
        .to_json()
        .map_err(|e| RemoteError::Protocol(e.to_string()))?;
    transport.send(frame).await?;

    loop {
        let Some(text) = transport.recv().await? else {
            return Err(RemoteError::Unavailable("connection closed".into()));
        };
        match ServerMessage::from_json(&text) {
            Ok(ServerMessage::Response { id: got, reply }) if got == id => return Ok(reply),
            // Replies to requests that already timed out.
            Ok(ServerMessage::Response { id: got, .. }) => {
                debug!(expected = id, got, "discarding stale response");
            }
            Ok(ServerMessage::Pong { .. }) => {}
            Ok(ServerMessage::Error { message }) => return Err(RemoteError::Protocol(message)),
            Err(e) => return Err(RemoteError::Protocol(e.to_string())),
        }
    }
}

fn unexpected(reply: Reply) -> RemoteError {
    match reply {
        Reply::Failed { kind, message } => RemoteError::from_failure(kind, message),
        other => RemoteError::Protocol(format!("unexpected reply: {other:?}")),
    }
}

impl<T: Transport> RemoteBackend for WebSocketRemote<T> {
    fn insert(&self, table: Table, record: Record) -> RemoteFuture<'_, Record> {
        Box::pin(async move {
            match self.call(RemoteOp::insert(table, record)).await? {
                Reply::Inserted { record } => Ok(record),
                other => Err(unexpected(other)),
            }
        })
    }

    fn update(&self, table: Table, id: String, patch: Record) -> RemoteFuture<'_, ()> {
        Box::pin(async move {
            match self.call(RemoteOp::update(table, id, patch)).await? {
                Reply::Updated => Ok(()),
                other => Err(unexpected(other)),
            }
        })
    }

    fn delete(&self, table: Table, id: String) -> RemoteFuture<'_, ()> {
        Box::pin(async move {
            match self.call(RemoteOp::delete(table, id)).await? {
                Reply::Deleted => Ok(()),
                other => Err(unexpected(other)),
            }
        })
    }

    fn select(
        &self,
        table: Table,
        filter: Filter,
        order: Option<Sort>,
    ) -> RemoteFuture<'_, Vec<Record>> {
        Box::pin(async move {
            match self.call(RemoteOp::select(table, filter, order)).await? {
                Reply::Rows { records } => Ok(records),
                other => Err(unexpected(other)),
            }
        })
    }
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
