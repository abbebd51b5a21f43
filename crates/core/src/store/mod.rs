// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Local persistence behind one interface.
//!
//! [`LocalStore`] is implemented by [`SqliteStore`] and [`DocumentStore`];
//! the backend is chosen once at startup with [`open`]. Callers hold a
//! [`StoreHandle`], which starts uninitialized and turns every operation
//! into a no-op until [`StoreHandle::initialize`] has completed.

mod document;
mod sqlite;

use std::fmt;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::query::{Filter, Sort};
use crate::record::{Key, Record};
use crate::schema::Table;

pub use document::DocumentStore;
pub use sqlite::SqliteStore;

/// Boxed future returned by store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Uniform CRUD over the local tables.
///
/// Both implementations project records onto the table schema, so a record
/// written through one backend reads back identically from the other.
pub trait LocalStore: Send + Sync {
    /// Creates missing tables and applies additive migrations. Idempotent.
    fn init(&self) -> StoreFuture<'_, ()>;

    /// Inserts or replaces a record by primary key and returns the key.
    ///
    /// A replaced record moves to the end of the table's storage order.
    fn insert(&self, table: Table, record: Record) -> StoreFuture<'_, Key>;

    /// Merges `patch` into the record at `key`. No-op if absent.
    fn update(&self, table: Table, key: Key, patch: Record) -> StoreFuture<'_, ()>;

    /// Deletes the record at `key`. No-op if absent.
    fn remove(&self, table: Table, key: Key) -> StoreFuture<'_, ()>;

    /// Returns the records matching every filter condition.
    ///
    /// Without a sort, records come back in storage order.
    fn query(&self, table: Table, filter: Filter, sort: Option<Sort>)
        -> StoreFuture<'_, Vec<Record>>;

    /// Deletes every record in `table`.
    fn clear(&self, table: Table) -> StoreFuture<'_, ()>;

    fn backend(&self) -> Backend;
}

/// Available storage backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Embedded relational engine (single database file).
    #[default]
    Sqlite,
    /// Document files (one JSONL file per table in a directory).
    Document,
}

impl Backend {
    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Sqlite => "sqlite",
            Backend::Document => "document",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sqlite" => Ok(Backend::Sqlite),
            "document" => Ok(Backend::Document),
            other => Err(Error::CorruptedData(format!(
                "unknown backend '{other}' (expected sqlite or document)"
            ))),
        }
    }
}

/// Opens the backend at `path` (a database file or a store directory).
///
/// The returned store still needs [`LocalStore::init`], which
/// [`StoreHandle::initialize`] takes care of.
pub fn open(backend: Backend, path: &Path) -> Result<Arc<dyn LocalStore>> {
    Ok(match backend {
        Backend::Sqlite => Arc::new(SqliteStore::open(path)?),
        Backend::Document => Arc::new(DocumentStore::open(path)?),
    })
}

/// Lifecycle of a [`StoreHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Uninitialized,
    Ready(Backend),
}

/// Shared handle to the process-wide store.
///
/// Clones share the same underlying store. Until [`initialize`] succeeds,
/// reads return empty results and writes do nothing.
///
/// [`initialize`]: StoreHandle::initialize
#[derive(Clone, Default)]
pub struct StoreHandle {
    inner: Arc<OnceLock<Arc<dyn LocalStore>>>,
}

impl StoreHandle {
    /// Creates an uninitialized handle.
    pub fn new() -> Self {
        StoreHandle::default()
    }

    /// Initializes `store` and makes it the handle's backend.
    ///
    /// If the handle is already ready, the existing store is re-initialized
    /// instead and `store` is dropped.
    pub async fn initialize(&self, store: Arc<dyn LocalStore>) -> Result<()> {
        if let Some(existing) = self.inner.get() {
            tracing::debug!(backend = %existing.backend(), "store already initialized");
            return existing.init().await;
        }
        store.init().await?;
        if self.inner.set(store).is_err() {
            tracing::debug!("store initialized concurrently; keeping the first");
        }
        Ok(())
    }

    pub fn state(&self) -> StoreState {
        match self.inner.get() {
            Some(store) => StoreState::Ready(store.backend()),
            None => StoreState::Uninitialized,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.inner.get().is_some()
    }

    fn store(&self, op: &str) -> Option<&Arc<dyn LocalStore>> {
        let store = self.inner.get();
        if store.is_none() {
            tracing::debug!(op, "store not initialized; skipping");
        }
        store
    }

    /// Upserts a record. Returns `None` when uninitialized.
    pub async fn insert(&self, table: Table, record: Record) -> Result<Option<Key>> {
        match self.store("insert") {
            Some(store) => store.insert(table, record).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn update(&self, table: Table, key: Key, patch: Record) -> Result<()> {
        match self.store("update") {
            Some(store) => store.update(table, key, patch).await,
            None => Ok(()),
        }
    }

    pub async fn remove(&self, table: Table, key: Key) -> Result<()> {
        match self.store("remove") {
            Some(store) => store.remove(table, key).await,
            None => Ok(()),
        }
    }

    pub async fn query(
        &self,
        table: Table,
        filter: Filter,
        sort: Option<Sort>,
    ) -> Result<Vec<Record>> {
        match self.store("query") {
            Some(store) => store.query(table, filter, sort).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn clear(&self, table: Table) -> Result<()> {
        match self.store("clear") {
            Some(store) => store.clear(table).await,
            None => Ok(()),
        }
    }
}

impl fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreHandle")
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
