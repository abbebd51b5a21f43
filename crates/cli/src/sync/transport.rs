// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Text-frame transport for the remote backend connection.
//!
//! The transport moves raw text frames; encoding and request correlation
//! live in [`super::remote::WebSocketRemote`], so tests can script a
//! conversation without a socket.

use std::future::Future;
use std::pin::Pin;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

/// Error type for transport operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("connection closed")]
    ConnectionClosed,

    #[error("send failed: {0}")]
    SendFailed(String),

    #[error("receive failed: {0}")]
    ReceiveFailed(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Boxed future returned by [`Transport`] methods.
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = TransportResult<T>> + Send + 'a>>;

/// A bidirectional channel of text frames.
pub trait Transport: Send + Sync {
    /// Connect to a remote server, replacing any previous connection.
    fn connect(&mut self, url: &str) -> TransportFuture<'_, ()>;

    /// Close the connection. Closing an unconnected transport is a no-op.
    fn disconnect(&mut self) -> TransportFuture<'_, ()>;

    /// Send one text frame.
    fn send(&mut self, frame: String) -> TransportFuture<'_, ()>;

    /// Receive the next text frame.
    ///
    /// Returns `None` if the peer closed the connection.
    fn recv(&mut self) -> TransportFuture<'_, Option<String>>;

    fn is_connected(&self) -> bool;
}

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket transport using tokio-tungstenite.
///
/// Any send or receive error drops the socket, so the next `connect`
/// starts clean.
#[derive(Default)]
pub struct WebSocketTransport {
    ws: Option<Socket>,
}

impl WebSocketTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for WebSocketTransport {
    fn connect(&mut self, url: &str) -> TransportFuture<'_, ()> {
        let url = url.to_string();
        Box::pin(async move {
            let (ws, _) = tokio_tungstenite::connect_async(url.as_str())
                .await
                .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
            self.ws = Some(ws);
            Ok(())
        })
    }

    fn disconnect(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            if let Some(mut ws) = self.ws.take() {
                // The peer may already be gone.
                let _ = ws.close(None).await;
            }
            Ok(())
        })
    }

    fn send(&mut self, frame: String) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            let ws = self.ws.as_mut().ok_or(TransportError::ConnectionClosed)?;
            if let Err(e) = ws.send(Message::Text(frame.into())).await {
                self.ws = None;
                return Err(TransportError::SendFailed(e.to_string()));
            }
            Ok(())
        })
    }

    fn recv(&mut self) -> TransportFuture<'_, Option<String>> {
        Box::pin(async move {
            let ws = self.ws.as_mut().ok_or(TransportError::ConnectionClosed)?;
            loop {
                match ws.next().await {
                    Some(Ok(Message::Text(text))) => return Ok(Some(text.to_string())),
                    Some(Ok(Message::Close(_))) | None => {
                        self.ws = None;
                        return Ok(None);
                    }
                    // Control and binary frames carry nothing for us.
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        self.ws = None;
                        return Err(TransportError::ReceiveFailed(e.to_string()));
                    }
                }
            }
        })
    }

    fn is_connected(&self) -> bool {
        self.ws.is_some()
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
