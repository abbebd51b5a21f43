// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Document backend: one JSONL file per table in a store directory.
//!
//! Tables are held in memory and the affected file is rewritten after
//! every mutation. Rows keep storage order; an upsert moves the row to
//! the end, the way `INSERT OR REPLACE` does in SQLite.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Backend, LocalStore, StoreFuture};
use crate::error::{Error, Result};
use crate::jsonl;
use crate::query::{Filter, Sort};
use crate::record::{Key, Record};
use crate::schema::{PrimaryKey, Table, TableSchema, PRIMARY_KEY};

const LOCK_FILE: &str = "store.lock";
const SEQUENCE_FILE: &str = "_sequences.jsonl";

/// Last assigned auto-increment value for a table.
#[derive(Debug, Serialize, Deserialize)]
struct Sequence {
    table: Table,
    seq: i64,
}

#[derive(Default)]
struct DocumentState {
    dir: Option<PathBuf>,
    tables: BTreeMap<Table, Vec<Record>>,
    sequences: BTreeMap<Table, i64>,
    loaded: bool,
    _lock: Option<File>,
}

/// Document-file-backed [`LocalStore`].
#[derive(Clone)]
pub struct DocumentStore {
    state: Arc<Mutex<DocumentState>>,
}

impl DocumentStore {
    /// Opens the store directory, creating it if needed, and takes the
    /// single-writer lock.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let lock = acquire_lock(&dir.join(LOCK_FILE))?;
        Ok(DocumentStore {
            state: Arc::new(Mutex::new(DocumentState {
                dir: Some(dir.to_path_buf()),
                _lock: Some(lock),
                ..DocumentState::default()
            })),
        })
    }

    /// A store that never touches the filesystem.
    pub fn in_memory() -> Self {
        DocumentStore {
            state: Arc::new(Mutex::new(DocumentState::default())),
        }
    }

    async fn run<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut DocumentState) -> Result<T> + Send + 'static,
    {
        let state = Arc::clone(&self.state);
        tokio::task::spawn_blocking(move || {
            let mut guard = state.lock().map_err(|_| Error::LockPoisoned)?;
            guard.load()?;
            f(&mut guard)
        })
        .await
        .map_err(|e| Error::Task(e.to_string()))?
    }
}

fn acquire_lock(path: &Path) -> Result<File> {
    use fs2::FileExt;

    let file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    file.try_lock_exclusive()
        .map_err(|_| Error::StoreLocked(path.display().to_string()))?;
    Ok(file)
}

fn table_path(dir: &Path, table: Table) -> PathBuf {
    dir.join(format!("{}.jsonl", table.name()))
}

/// Re-shapes a stored row onto the current schema.
///
/// Columns added since the row was written read back as null.
fn project(schema: &TableSchema, mut stored: Record) -> Record {
    schema
        .column_names()
        .map(|name| {
            let value = stored
                .remove(name)
                .map_or(Value::Null, |v| schema.normalize(name, v));
            (name.to_string(), value)
        })
        .collect()
}

fn key_matches(row: &Record, key: &Value) -> bool {
    !key.is_null() && row.get(PRIMARY_KEY) == Some(key)
}

impl DocumentState {
    fn load(&mut self) -> Result<()> {
        if self.loaded {
            return Ok(());
        }
        if let Some(dir) = &self.dir {
            for table in Table::ALL {
                let schema = table.schema();
                let rows: Vec<Record> = jsonl::read_all(&table_path(dir, table))?;
                self.tables
                    .insert(table, rows.into_iter().map(|r| project(schema, r)).collect());
            }
            let sequences: Vec<Sequence> = jsonl::read_all(&dir.join(SEQUENCE_FILE))?;
            self.sequences = sequences.into_iter().map(|s| (s.table, s.seq)).collect();
        }
        self.loaded = true;
        Ok(())
    }

    fn rows(&mut self, table: Table) -> &mut Vec<Record> {
        self.tables.entry(table).or_default()
    }

    fn persist(&self, table: Table, rows: &[Record]) -> Result<()> {
        match &self.dir {
            Some(dir) => jsonl::write_all(&table_path(dir, table), rows),
            None => Ok(()),
        }
    }

    /// Writes `rows` as the new content of `table`; memory only changes
    /// once the file is written.
    fn commit(&mut self, table: Table, rows: Vec<Record>) -> Result<()> {
        self.persist(table, &rows)?;
        self.tables.insert(table, rows);
        Ok(())
    }

    /// Raises the table's sequence to at least `id`.
    fn advance_sequence(&mut self, table: Table, id: i64) -> Result<()> {
        let mut sequences = self.sequences.clone();
        let seq = sequences.entry(table).or_insert(0);
        if *seq >= id {
            return Ok(());
        }
        *seq = id;
        if let Some(dir) = &self.dir {
            let rows: Vec<Sequence> = sequences
                .iter()
                .map(|(table, seq)| Sequence {
                    table: *table,
                    seq: *seq,
                })
                .collect();
            jsonl::write_all(&dir.join(SEQUENCE_FILE), &rows)?;
        }
        self.sequences = sequences;
        Ok(())
    }

    fn init(&mut self) -> Result<()> {
        let Some(dir) = &self.dir else {
            return Ok(());
        };
        for table in Table::ALL {
            if !table_path(dir, table).exists() {
                let rows = self.tables.get(&table).cloned().unwrap_or_default();
                self.persist(table, &rows)?;
                tracing::debug!(%table, "created table file");
            }
        }
        Ok(())
    }

    /// Next auto-increment key: never reuses a value, even after deletes.
    fn next_id(&mut self, table: Table) -> i64 {
        let max_row = self
            .rows(table)
            .iter()
            .filter_map(|r| r.get(PRIMARY_KEY).and_then(Value::as_i64))
            .max()
            .unwrap_or(0);
        let seq = self.sequences.get(&table).copied().unwrap_or(0);
        seq.max(max_row) + 1
    }

    fn insert(&mut self, table: Table, record: Record) -> Result<Key> {
        let schema = table.schema();
        let mut row = schema.prepare_insert(record)?;

        if schema.primary_key == PrimaryKey::AutoIncrement {
            let id = match row.get(PRIMARY_KEY).and_then(Value::as_i64) {
                Some(id) => id,
                None => {
                    let id = self.next_id(table);
                    row.insert(PRIMARY_KEY.to_string(), Value::from(id));
                    id
                }
            };
            // A sequence value burnt by a failed write is never reused.
            self.advance_sequence(table, id)?;
        }

        let key_value = row.get(PRIMARY_KEY).cloned().unwrap_or(Value::Null);
        let key = Key::from_value(&key_value).ok_or_else(|| Error::MissingKey {
            table: table.name().to_string(),
        })?;

        let mut rows = self.rows(table).clone();
        rows.retain(|r| !key_matches(r, &key_value));
        rows.push(row);
        self.commit(table, rows)?;
        Ok(key)
    }

    fn update(&mut self, table: Table, key: &Key, patch: Record) -> Result<()> {
        let schema = table.schema();
        let patch = schema.prepare_patch(patch)?;
        if patch.is_empty() {
            return Ok(());
        }
        let key_value = schema.normalize(PRIMARY_KEY, key.to_value());
        let mut rows = self.rows(table).clone();
        let Some(row) = rows.iter_mut().find(|r| key_matches(r, &key_value)) else {
            return Ok(());
        };
        row.extend(patch);
        self.commit(table, rows)
    }

    fn remove(&mut self, table: Table, key: &Key) -> Result<()> {
        let schema = table.schema();
        let key_value = schema.normalize(PRIMARY_KEY, key.to_value());
        let mut rows = self.rows(table).clone();
        let before = rows.len();
        rows.retain(|r| !key_matches(r, &key_value));
        if rows.len() == before {
            return Ok(());
        }
        self.commit(table, rows)
    }

    fn query(&mut self, table: Table, filter: &Filter, sort: Option<&Sort>) -> Result<Vec<Record>> {
        let schema = table.schema();
        let filter = filter.resolve(schema)?;
        if let Some(sort) = sort {
            sort.validate(schema)?;
        }

        let mut rows: Vec<Record> = self
            .rows(table)
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        if let Some(sort) = sort {
            sort.apply(&mut rows);
        }
        Ok(rows)
    }

    fn clear(&mut self, table: Table) -> Result<()> {
        self.commit(table, Vec::new())
    }
}

impl LocalStore for DocumentStore {
    fn init(&self) -> StoreFuture<'_, ()> {
        Box::pin(self.run(|state| state.init()))
    }

    fn insert(&self, table: Table, record: Record) -> StoreFuture<'_, Key> {
        Box::pin(self.run(move |state| state.insert(table, record)))
    }

    fn update(&self, table: Table, key: Key, patch: Record) -> StoreFuture<'_, ()> {
        Box::pin(self.run(move |state| state.update(table, &key, patch)))
    }

    fn remove(&self, table: Table, key: Key) -> StoreFuture<'_, ()> {
        Box::pin(self.run(move |state| state.remove(table, &key)))
    }

    fn query(
        &self,
        table: Table,
        filter: Filter,
        sort: Option<Sort>,
    ) -> StoreFuture<'_, Vec<Record>> {
        Box::pin(self.run(move |state| state.query(table, &filter, sort.as_ref())))
    }

    fn clear(&self, table: Table) -> StoreFuture<'_, ()> {
        Box::pin(self.run(move |state| state.clear(table)))
    }

    fn backend(&self) -> Backend {
        Backend::Document
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
