// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket server implementation.
//!
//! Each connection is served sequentially: one text frame in, one text
//! frame out.

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info};

use eq_core::protocol::{ClientMessage, ServerMessage};

use crate::state::ServerState;

/// Run the WebSocket server on the given address.
pub async fn run(addr: SocketAddr, state: ServerState) -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on: {}", addr);

    loop {
        let (stream, peer_addr) = listener.accept().await?;
        let state = state.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }
}

/// Handle a single WebSocket connection.
pub(crate) async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: ServerState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    info!("New WebSocket connection from: {}", peer_addr);

    let (mut ws_sink, mut ws_stream) = ws_stream.split();

    while let Some(msg) = ws_stream.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let response = handle_client_message(&text, &state).await;
                ws_sink.send(Message::Text(response.to_json()?.into())).await?;
            }
            Ok(Message::Close(_)) => {
                info!("Client {} disconnected", peer_addr);
                break;
            }
            Ok(Message::Ping(data)) => {
                ws_sink.send(Message::Pong(data)).await?;
            }
            Ok(_) => {
                // Ignore other message types (Binary, Pong, Frame)
            }
            Err(e) => {
                error!("WebSocket error from {}: {}", peer_addr, e);
                break;
            }
        }
    }

    info!("Connection closed: {}", peer_addr);
    Ok(())
}

/// Process one client frame and build the answer.
pub(crate) async fn handle_client_message(text: &str, state: &ServerState) -> ServerMessage {
    let msg = match ClientMessage::from_json(text) {
        Ok(msg) => msg,
        Err(e) => return ServerMessage::error(format!("invalid message: {}", e)),
    };
    debug!("Received message: {:?}", msg);

    match msg {
        ClientMessage::Request { id, op } => {
            let table = op.table_name().to_string();
            let reply = state.apply(op).await;
            debug!(id, table = %table, ?reply, "request handled");
            ServerMessage::response(id, reply)
        }
        ClientMessage::Ping { id } => {
            debug!("Ping received: {}", id);
            ServerMessage::pong(id)
        }
    }
}
