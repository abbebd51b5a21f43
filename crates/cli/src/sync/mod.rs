// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote backend client, queue replay and connectivity tracking.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ SyncEngine   │────►│  Remote     │────►│  Transport  │────► eq-remote
//! │ (queue drain)│     │  Backend    │     │   (trait)   │
//! └──────────────┘     └─────────────┘     └─────────────┘
//!        ▲
//!        │ triggers
//! ┌──────────────┐     ┌──────────────┐
//! │ Network      │◄────│ Connectivity │  (probe or manual)
//! │ Monitor      │     │   (trait)    │
//! └──────────────┘     └──────────────┘
//! ```

mod engine;
mod network;
mod remote;
mod transport;

pub use engine::{SyncEngine, SyncOutcome, SyncReport};
pub use network::{
    Connectivity, ManualConnectivity, MonitorHandle, NetworkMonitor, NetworkStatus,
    ProbeConnectivity,
};
pub use remote::{
    NoRemote, RemoteBackend, RemoteError, RemoteFuture, RemoteResult, WebSocketRemote,
};
pub use transport::{Transport, TransportError, TransportFuture, WebSocketTransport};

#[cfg(test)]
pub(crate) mod test_helpers;
