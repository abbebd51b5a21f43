// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Server state: the canonical survey tables.

use std::path::Path;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use eq_core::entity::remote_exclusions;
use eq_core::protocol::{FailureKind, RemoteOp, Reply};
use eq_core::record::without;
use eq_core::schema::PRIMARY_KEY;
use eq_core::{Filter, Key, Record, Result, SqliteStore, StoreHandle, Table};
use tracing::debug;

const DB_FILE_NAME: &str = "remote.db";

/// Shared server state. Clones share the same store.
#[derive(Clone)]
pub struct ServerState {
    store: StoreHandle,
}

impl ServerState {
    /// Opens (or creates) the database in the given directory.
    pub async fn open(data_dir: &Path) -> Result<Self> {
        let store = SqliteStore::open(&data_dir.join(DB_FILE_NAME))?;
        Self::with_store(Arc::new(store)).await
    }

    /// A state that never touches the filesystem.
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        Self::with_store(Arc::new(SqliteStore::open_in_memory()?)).await
    }

    async fn with_store(store: Arc<SqliteStore>) -> Result<Self> {
        let handle = StoreHandle::new();
        handle.initialize(store).await?;
        Ok(ServerState { store: handle })
    }

    /// Applies one table operation. Every outcome, including store errors,
    /// is a reply.
    pub async fn apply(&self, op: RemoteOp) -> Reply {
        let Some(table) = Table::from_remote_name(op.table_name()).filter(|t| *t != Table::SyncQueue)
        else {
            return Reply::failed(
                FailureKind::Rejected,
                format!("unknown table: {}", op.table_name()),
            );
        };

        let result = match op {
            RemoteOp::Insert { record, .. } => self.insert(table, record).await,
            RemoteOp::Update { id, patch, .. } => self.update(table, &id, patch).await,
            RemoteOp::Delete { id, .. } => self
                .store
                .remove(table, Key::from(id))
                .await
                .map(|()| Reply::Deleted),
            RemoteOp::Select { filter, order, .. } => self
                .store
                .query(table, filter, order)
                .await
                .map(|rows| Reply::Rows {
                    records: rows.iter().map(|r| outgoing(table, r)).collect(),
                }),
        };
        result.unwrap_or_else(|e| Reply::failed(FailureKind::Rejected, e.to_string()))
    }

    async fn insert(&self, table: Table, mut record: Record) -> Result<Reply> {
        let Some(key) = Key::of(&record) else {
            return Ok(Reply::failed(FailureKind::Rejected, "missing id"));
        };
        if self.find(table, &key).await?.is_some() {
            return Ok(Reply::failed(
                FailureKind::Conflict,
                format!("duplicate id {key} in {}", table.remote_name()),
            ));
        }

        let now = now();
        for field in ["created_at", "updated_at"] {
            if table.schema().has_column(field) && !record.contains_key(field) {
                record.insert(field.into(), now.clone().into());
            }
        }
        self.store.insert(table, record).await?;
        debug!(table = %table, id = %key, "inserted");

        match self.find(table, &key).await? {
            Some(stored) => Ok(Reply::Inserted {
                record: outgoing(table, &stored),
            }),
            None => Ok(Reply::failed(FailureKind::Rejected, "record not stored")),
        }
    }

    /// Unknown ids are a no-op success.
    async fn update(&self, table: Table, id: &str, mut patch: Record) -> Result<Reply> {
        patch.remove(PRIMARY_KEY);
        if table.schema().has_column("updated_at") && !patch.contains_key("updated_at") {
            patch.insert("updated_at".into(), now().into());
        }
        self.store.update(table, Key::from(id), patch).await?;
        Ok(Reply::Updated)
    }

    async fn find(&self, table: Table, key: &Key) -> Result<Option<Record>> {
        let mut rows = self
            .store
            .query(table, Filter::new().eq(PRIMARY_KEY, key.to_value()), None)
            .await?;
        Ok(rows.pop())
    }
}

/// Drops client-local columns before a row leaves the server.
fn outgoing(table: Table, row: &Record) -> Record {
    without(row, &remote_exclusions(table))
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
