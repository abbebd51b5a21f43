// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity sources and the network monitor.
//!
//! The monitor tracks online state and the pending queue size, and starts
//! a sync run whenever it observes the device online with queued work and
//! no run in flight.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::http::Uri;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::engine::{SyncEngine, SyncOutcome};
use crate::error::Result;

/// Source of online/offline signals.
pub trait Connectivity: Send + Sync {
    /// Checks connectivity now.
    fn fetch_once(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>>;

    /// Receiver of connectivity changes. Dropping it unsubscribes.
    ///
    /// Must be called from within a tokio runtime.
    fn subscribe(&self) -> watch::Receiver<bool>;
}

/// Connectivity switched by hand.
///
/// Used for `--offline`, devices without a remote, and tests.
pub struct ManualConnectivity {
    state: watch::Sender<bool>,
}

impl ManualConnectivity {
    pub fn new(online: bool) -> Self {
        let (state, _) = watch::channel(online);
        ManualConnectivity { state }
    }

    pub fn set_online(&self, online: bool) {
        self.state.send_replace(online);
    }
}

impl Connectivity for ManualConnectivity {
    fn fetch_once(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        let online = *self.state.borrow();
        Box::pin(async move { online })
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }
}

/// Reachability of the remote host, by TCP connect.
///
/// `subscribe` starts a background probe loop on first use; it stops when
/// the probe is dropped.
pub struct ProbeConnectivity {
    target: String,
    timeout: Duration,
    interval: Duration,
    state: Arc<watch::Sender<bool>>,
    started: AtomicBool,
    cancel: CancellationToken,
}

impl ProbeConnectivity {
    /// Probes the host and port of a `ws://` or `wss://` URL.
    ///
    /// Returns `None` if the URL has no host.
    pub fn for_url(url: &str, interval: Duration, timeout: Duration) -> Option<Self> {
        let target = probe_target(url)?;
        let (state, _) = watch::channel(false);
        Some(ProbeConnectivity {
            target,
            timeout,
            interval,
            state: Arc::new(state),
            started: AtomicBool::new(false),
            cancel: CancellationToken::new(),
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

impl Drop for ProbeConnectivity {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// `host:port` to probe for a remote URL; the port defaults by scheme.
pub(crate) fn probe_target(url: &str) -> Option<String> {
    let uri: Uri = url.parse().ok()?;
    let host = uri.host().filter(|h| !h.is_empty())?;
    let port = match (uri.port_u16(), uri.scheme_str()) {
        (Some(port), _) => port,
        (None, Some("wss" | "https")) => 443,
        (None, _) => 80,
    };
    Some(format!("{host}:{port}"))
}

async fn probe(target: &str, timeout: Duration) -> bool {
    matches!(
        tokio::time::timeout(timeout, TcpStream::connect(target)).await,
        Ok(Ok(_))
    )
}

impl Connectivity for ProbeConnectivity {
    fn fetch_once(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        Box::pin(async move {
            let online = probe(&self.target, self.timeout).await;
            self.state.send_replace(online);
            online
        })
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        if !self.started.swap(true, Ordering::AcqRel) {
            let state = Arc::clone(&self.state);
            let cancel = self.cancel.clone();
            let target = self.target.clone();
            let (timeout, interval) = (self.timeout, self.interval);
            tokio::spawn(async move {
                loop {
                    let online = probe(&target, timeout).await;
                    state.send_if_modified(|current| {
                        let changed = *current != online;
                        *current = online;
                        changed
                    });
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(interval) => {}
                    }
                }
                debug!(target = %target, "connectivity probe stopped");
            });
        }
        self.state.subscribe()
    }
}

/// Snapshot of the monitor, as shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkStatus {
    pub is_online: bool,
    pub pending: usize,
    pub is_syncing: bool,
    /// RFC 3339 time of the last completed sync run.
    pub last_sync: Option<String>,
}

struct MonitorState {
    engine: Arc<SyncEngine>,
    connectivity: Arc<dyn Connectivity>,
    online: AtomicBool,
    pending: AtomicUsize,
}

/// Tracks connectivity and triggers sync runs on reconnection.
#[derive(Clone)]
pub struct NetworkMonitor {
    inner: Arc<MonitorState>,
}

impl NetworkMonitor {
    pub fn new(engine: Arc<SyncEngine>, connectivity: Arc<dyn Connectivity>) -> Self {
        NetworkMonitor {
            inner: Arc::new(MonitorState {
                engine,
                connectivity,
                online: AtomicBool::new(false),
                pending: AtomicUsize::new(0),
            }),
        }
    }

    pub fn is_online(&self) -> bool {
        self.inner.online.load(Ordering::Acquire)
    }

    pub fn status(&self) -> NetworkStatus {
        NetworkStatus {
            is_online: self.is_online(),
            pending: self.inner.pending.load(Ordering::Acquire),
            is_syncing: self.inner.engine.is_running(),
            last_sync: self.inner.engine.last_sync_rfc3339(),
        }
    }

    /// Fetches connectivity now and observes it.
    pub async fn check(&self) -> Result<NetworkStatus> {
        let online = self.inner.connectivity.fetch_once().await;
        self.observe(online).await
    }

    /// Fetches connectivity and the pending count without syncing.
    pub async fn refresh(&self) -> Result<NetworkStatus> {
        let online = self.inner.connectivity.fetch_once().await;
        self.inner.online.store(online, Ordering::Release);
        self.refresh_pending().await?;
        Ok(self.status())
    }

    /// Records a connectivity observation, refreshes the pending count and
    /// syncs if online with queued work and no run in flight.
    pub async fn observe(&self, online: bool) -> Result<NetworkStatus> {
        if self.inner.online.swap(online, Ordering::AcqRel) != online {
            info!(online, "connectivity changed");
        }
        let pending = self.refresh_pending().await?;
        if online && pending > 0 && !self.inner.engine.is_running() {
            self.auto_sync().await?;
        }
        Ok(self.status())
    }

    /// Manual "sync now". Refused while offline.
    pub async fn sync_now(&self) -> Result<SyncOutcome> {
        let online = self.inner.connectivity.fetch_once().await;
        self.inner.online.store(online, Ordering::Release);
        if !online {
            debug!("sync requested while offline");
            self.refresh_pending().await?;
            return Ok(SyncOutcome::Offline);
        }
        let outcome = self.inner.engine.run().await?;
        self.refresh_pending().await?;
        Ok(outcome)
    }

    /// Watches connectivity in a background task until the handle is
    /// stopped or dropped.
    pub fn start(&self) -> MonitorHandle {
        let mut changes = self.inner.connectivity.subscribe();
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let monitor = self.clone();

        let task = tokio::spawn(async move {
            if let Err(e) = monitor.check().await {
                warn!(error = %e, "initial connectivity check failed");
            }
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    changed = changes.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let online = *changes.borrow_and_update();
                        if let Err(e) = monitor.observe(online).await {
                            warn!(error = %e, "connectivity observation failed");
                        }
                    }
                }
            }
            debug!("network monitor stopped");
        });

        MonitorHandle {
            cancel,
            task: Some(task),
        }
    }

    async fn refresh_pending(&self) -> Result<usize> {
        let pending = self.inner.engine.queue().len().await?;
        self.inner.pending.store(pending, Ordering::Release);
        Ok(pending)
    }

    /// Runs until the queue is empty, a run makes no progress, or the
    /// device goes offline.
    async fn auto_sync(&self) -> Result<()> {
        loop {
            let SyncOutcome::Completed(report) = self.inner.engine.run().await? else {
                return Ok(());
            };
            self.inner.pending.store(report.remaining, Ordering::Release);
            if report.remaining == 0 || !report.made_progress() || !self.is_online() {
                return Ok(());
            }
        }
    }
}

/// Running monitor task. Dropping it stops the task.
pub struct MonitorHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    /// Stops the task and waits for it to finish its current observation.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "network monitor task failed");
            }
        }
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
#[path = "network_tests.rs"]
mod tests;
