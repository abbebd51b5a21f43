// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only log of mutations waiting to be pushed to the remote.
//!
//! Entries are kept in insertion order and never coalesced: N offline
//! edits of one record produce N entries, replayed one by one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::query::{Filter, Sort};
use crate::record::{from_record, Key, Record};
use crate::schema::{Table, PRIMARY_KEY};
use crate::store::StoreHandle;

/// Kind of queued mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "create" => Ok(Action::Create),
            "update" => Ok(Action::Update),
            "delete" => Ok(Action::Delete),
            other => Err(Error::InvalidAction(other.to_string())),
        }
    }
}

/// A queue row as stored.
///
/// Fields are kept raw so one malformed entry can be reported without
/// making the rest of the queue unreadable; use the accessors to decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncQueueEntry {
    pub id: i64,
    /// Remote table name.
    pub table_name: String,
    pub record_id: String,
    pub action: String,
    /// Payload snapshot serialized at enqueue time.
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub retry_count: i64,
}

impl SyncQueueEntry {
    pub fn table(&self) -> Result<Table> {
        Table::from_remote_name(&self.table_name).ok_or_else(|| {
            Error::CorruptedData(format!(
                "queue entry {} names unknown table '{}'",
                self.id, self.table_name
            ))
        })
    }

    pub fn action(&self) -> Result<Action> {
        self.action.parse().map_err(|_| {
            Error::CorruptedData(format!(
                "queue entry {} has unknown action '{}'",
                self.id, self.action
            ))
        })
    }

    /// Decodes the payload snapshot (empty for entries without data).
    pub fn payload(&self) -> Result<Record> {
        let Some(data) = self.data.as_deref().filter(|d| !d.trim().is_empty()) else {
            return Ok(Record::new());
        };
        match serde_json::from_str(data)? {
            Value::Object(map) => Ok(map),
            other => Err(Error::CorruptedData(format!(
                "queue entry {} payload is not an object: {other}",
                self.id
            ))),
        }
    }
}

/// The mutation queue, stored in the `sync_queue` table.
#[derive(Debug, Clone)]
pub struct SyncQueue {
    store: StoreHandle,
}

impl SyncQueue {
    pub fn new(store: StoreHandle) -> Self {
        SyncQueue { store }
    }

    /// Appends one entry. The payload is serialized now, so later changes
    /// to the caller's record do not leak into the queue.
    ///
    /// Returns the new entry id, or `None` if the store is not initialized.
    pub async fn append(
        &self,
        table: Table,
        record_id: &str,
        action: Action,
        payload: &Record,
    ) -> Result<Option<i64>> {
        let mut row = Record::new();
        row.insert("table_name".into(), table.remote_name().into());
        row.insert("record_id".into(), record_id.into());
        row.insert("action".into(), action.as_str().into());
        row.insert("data".into(), serde_json::to_string(payload)?.into());

        let key = self.store.insert(Table::SyncQueue, row).await?;
        tracing::debug!(%table, record_id, %action, "queued mutation");
        Ok(key.and_then(|k| k.as_int()))
    }

    /// Snapshot of all entries in insertion order.
    pub async fn entries(&self) -> Result<Vec<SyncQueueEntry>> {
        let rows = self
            .store
            .query(Table::SyncQueue, Filter::new(), Some(Sort::asc(PRIMARY_KEY)))
            .await?;
        rows.into_iter().map(from_record::<SyncQueueEntry>).collect()
    }

    pub async fn len(&self) -> Result<usize> {
        let rows = self
            .store
            .query(Table::SyncQueue, Filter::new(), None)
            .await?;
        Ok(rows.len())
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Number of entries still queued for one record.
    pub async fn pending_for(&self, table: Table, record_id: &str) -> Result<usize> {
        let filter = Filter::new()
            .eq("table_name", table.remote_name())
            .eq("record_id", record_id);
        let rows = self.store.query(Table::SyncQueue, filter, None).await?;
        Ok(rows.len())
    }

    pub async fn remove(&self, id: i64) -> Result<()> {
        self.store.remove(Table::SyncQueue, Key::Int(id)).await
    }

    /// Bumps `retry_count` after a failed push.
    pub async fn record_failure(&self, entry: &SyncQueueEntry) -> Result<()> {
        let mut patch = Record::new();
        patch.insert("retry_count".into(), (entry.retry_count + 1).into());
        self.store
            .update(Table::SyncQueue, Key::Int(entry.id), patch)
            .await
    }

    /// Drops every queued entry.
    pub async fn clear(&self) -> Result<()> {
        self.store.clear(Table::SyncQueue).await
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
