// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Startup wiring: locate the project, open the local store and build the
//! services over the configured remote.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use eq_core::StoreHandle;
use tracing::{debug, warn};

use crate::config::{find_work_dir, Config};
use crate::error::Result;
use crate::services::Services;
use crate::sync::{
    Connectivity, ManualConnectivity, NoRemote, ProbeConnectivity, RemoteBackend,
    WebSocketRemote,
};

const LAST_SYNC_FILE_NAME: &str = "last_sync";

/// An opened project.
pub struct App {
    pub work_dir: PathBuf,
    pub config: Config,
    pub services: Services,
    offline: bool,
}

impl App {
    /// Opens the project containing `directory` (or the current directory).
    ///
    /// With `offline`, or without a `[remote]` section, the remote is never
    /// contacted and every write goes to the queue.
    pub async fn open(directory: Option<&str>, offline: bool) -> Result<App> {
        let start = match directory {
            Some(dir) => PathBuf::from(dir),
            None => std::env::current_dir()?,
        };
        let work_dir = find_work_dir(&start)?;
        let config = Config::load(&work_dir)?;

        let store_path = config.store_path(&work_dir);
        debug!(backend = config.backend.as_str(), path = %store_path.display(), "opening local store");
        let store = StoreHandle::new();
        store
            .initialize(eq_core::store::open(config.backend, &store_path)?)
            .await?;

        let (remote, connectivity) = connect(&config, offline);
        let services = Services::new(store, remote, connectivity);
        if let Some(at) = load_last_sync(&work_dir) {
            services.engine.restore_last_sync(at);
        }

        Ok(App {
            work_dir,
            config,
            services,
            offline,
        })
    }

    /// Remote URL in use, `None` when offline or local only.
    pub fn remote_url(&self) -> Option<&str> {
        if self.offline {
            None
        } else {
            self.config.remote_url()
        }
    }

    /// Persists the engine's last completed run, if any.
    pub fn save_last_sync(&self) -> Result<()> {
        if let Some(stamp) = self.services.engine.last_sync_rfc3339() {
            fs::write(self.work_dir.join(LAST_SYNC_FILE_NAME), stamp)?;
        }
        Ok(())
    }
}

fn connect(config: &Config, offline: bool) -> (Arc<dyn RemoteBackend>, Arc<dyn Connectivity>) {
    let remote = match (&config.remote, offline) {
        (Some(remote), false) => remote,
        _ => return local_only(),
    };
    let Some(probe) = ProbeConnectivity::for_url(
        &remote.url,
        Duration::from_secs(remote.probe_interval_secs),
        Duration::from_millis(remote.probe_timeout_ms),
    ) else {
        warn!(url = %remote.url, "cannot derive a probe target, staying offline");
        return local_only();
    };
    debug!(url = %remote.url, target = probe.target(), "remote configured");
    (
        Arc::new(WebSocketRemote::connect_lazy(
            remote.url.clone(),
            Duration::from_millis(remote.request_timeout_ms),
        )),
        Arc::new(probe),
    )
}

fn local_only() -> (Arc<dyn RemoteBackend>, Arc<dyn Connectivity>) {
    (Arc::new(NoRemote), Arc::new(ManualConnectivity::new(false)))
}

/// Reads the persisted last-sync time. A missing or unreadable file means
/// no sync has completed yet.
pub fn load_last_sync(work_dir: &Path) -> Option<DateTime<Utc>> {
    let content = fs::read_to_string(work_dir.join(LAST_SYNC_FILE_NAME)).ok()?;
    DateTime::parse_from_rfc3339(content.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
