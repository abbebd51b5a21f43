// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Replays the sync queue against the remote backend.
//!
//! A run works on a snapshot of the queue taken when it starts and pushes
//! entries one at a time in queue order. A failed entry stays queued with
//! its `retry_count` bumped; later entries for the same record are held
//! back until the next run so per-record write order is preserved.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use eq_core::entity::remote_exclusions;
use eq_core::record::without;
use eq_core::{Action, Key, Record, StoreHandle, SyncQueue, SyncQueueEntry, SYNCED};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::remote::{RemoteBackend, RemoteError};
use crate::error::Result;

/// Counts from one sync run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Entries in the snapshot.
    pub attempted: usize,
    pub pushed: usize,
    pub failed: usize,
    /// Entries held back behind an earlier failure for the same record.
    pub deferred: usize,
    /// Queue length after the run.
    pub remaining: usize,
}

impl SyncReport {
    pub fn made_progress(&self) -> bool {
        self.pushed > 0
    }
}

/// What a sync trigger did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Completed(SyncReport),
    /// Another run was in flight; this trigger was ignored.
    AlreadyRunning,
    /// Refused because the device is offline.
    Offline,
}

#[derive(Debug, thiserror::Error)]
enum ItemError {
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error(transparent)]
    Store(#[from] eq_core::Error),
}

/// Clears the running flag when a run ends, including by early return.
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drains the sync queue. At most one run is in flight at a time.
pub struct SyncEngine {
    store: StoreHandle,
    queue: SyncQueue,
    remote: Arc<dyn RemoteBackend>,
    running: AtomicBool,
    /// Unix millis of the last completed run, 0 if none.
    last_sync_ms: AtomicI64,
}

impl SyncEngine {
    pub fn new(store: StoreHandle, queue: SyncQueue, remote: Arc<dyn RemoteBackend>) -> Self {
        SyncEngine {
            store,
            queue,
            remote,
            running: AtomicBool::new(false),
            last_sync_ms: AtomicI64::new(0),
        }
    }

    pub fn queue(&self) -> &SyncQueue {
        &self.queue
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn last_sync(&self) -> Option<DateTime<Utc>> {
        match self.last_sync_ms.load(Ordering::Acquire) {
            0 => None,
            ms => Utc.timestamp_millis_opt(ms).single(),
        }
    }

    /// Seeds the last-sync time persisted by a previous process.
    pub fn restore_last_sync(&self, at: DateTime<Utc>) {
        self.last_sync_ms
            .store(at.timestamp_millis(), Ordering::Release);
    }

    /// Last completed run as RFC 3339.
    pub fn last_sync_rfc3339(&self) -> Option<String> {
        self.last_sync()
            .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    /// Runs one pass over the queue.
    ///
    /// Per-entry failures are logged and counted, never returned; only a
    /// failure to read the queue itself is an error.
    pub async fn run(&self) -> Result<SyncOutcome> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("sync already running, trigger ignored");
            return Ok(SyncOutcome::AlreadyRunning);
        }
        let _guard = RunGuard(&self.running);

        let entries = self.queue.entries().await?;
        let mut report = SyncReport {
            attempted: entries.len(),
            ..SyncReport::default()
        };
        let mut held: HashSet<(String, String)> = HashSet::new();

        for entry in &entries {
            let record = (entry.table_name.clone(), entry.record_id.clone());
            if held.contains(&record) {
                report.deferred += 1;
                continue;
            }
            match self.push(entry).await {
                Ok(()) => report.pushed += 1,
                Err(e) => {
                    warn!(
                        entry = entry.id,
                        table = %entry.table_name,
                        record = %entry.record_id,
                        action = %entry.action,
                        error = %e,
                        "sync item failed, kept for retry"
                    );
                    report.failed += 1;
                    held.insert(record);
                    if let Err(e) = self.queue.record_failure(entry).await {
                        warn!(entry = entry.id, error = %e, "could not record sync failure");
                    }
                }
            }
        }

        report.remaining = match self.queue.len().await {
            Ok(len) => len,
            Err(e) => {
                warn!(error = %e, "could not count the queue after sync");
                report.attempted - report.pushed
            }
        };
        self.last_sync_ms
            .store(Utc::now().timestamp_millis(), Ordering::Release);
        info!(
            pushed = report.pushed,
            failed = report.failed,
            deferred = report.deferred,
            remaining = report.remaining,
            "sync run complete"
        );
        Ok(SyncOutcome::Completed(report))
    }

    async fn push(&self, entry: &SyncQueueEntry) -> std::result::Result<(), ItemError> {
        let table = entry.table()?;
        let action = entry.action()?;
        let id = entry.record_id.clone();

        match action {
            Action::Create => {
                let payload = without(&entry.payload()?, &remote_exclusions(table));
                match self.remote.insert(table, payload).await {
                    Ok(_) => {}
                    Err(e) if e.is_conflict() => {
                        info!(table = %table, record = %id, "create already applied remotely");
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            Action::Update => {
                let patch = without(&entry.payload()?, &remote_exclusions(table));
                self.remote.update(table, id.clone(), patch).await?;
            }
            Action::Delete => match self.remote.delete(table, id.clone()).await {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {
                    debug!(table = %table, record = %id, "delete target already absent");
                }
                Err(e) => return Err(e.into()),
            },
        }

        self.queue.remove(entry.id).await?;
        if action != Action::Delete && self.queue.pending_for(table, &id).await? == 0 {
            let mut patch = Record::new();
            patch.insert(SYNCED.into(), 1.into());
            self.store.update(table, Key::from(id), patch).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
