// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite backend.
//!
//! One connection behind a mutex; every call runs on tokio's blocking
//! pool. Identifiers in generated SQL come from the static schema only,
//! values are always bound as parameters.

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection};
use serde_json::Value;

use super::{Backend, LocalStore, StoreFuture};
use crate::error::{Error, Result};
use crate::query::{Filter, Sort};
use crate::record::{Key, Record};
use crate::schema::{Table, TableSchema, ADDITIVE_COLUMNS, PRIMARY_KEY};

const INDEXES: &str = "
CREATE INDEX IF NOT EXISTS idx_personnes_session ON personnes(session_id);
CREATE INDEX IF NOT EXISTS idx_personnes_participant ON personnes(participant_id);
CREATE INDEX IF NOT EXISTS idx_session_participants_session ON session_participants(session_id);
CREATE INDEX IF NOT EXISTS idx_sync_queue_record ON sync_queue(table_name, record_id);
";

/// SQLite-backed [`LocalStore`].
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) the database file at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA foreign_keys = OFF;
             PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        Ok(Self::from_connection(conn))
    }

    /// Opens a private in-memory database (for tests and benches).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = OFF;")?;
        Ok(Self::from_connection(conn))
    }

    /// Wraps an existing connection.
    pub fn from_connection(conn: Connection) -> Self {
        SqliteStore {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    async fn run<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| Error::LockPoisoned)?;
            f(&mut guard)
        })
        .await
        .map_err(|e| Error::Task(e.to_string()))?
    }
}

/// Creates tables and indexes, then applies additive migrations.
pub(crate) fn migrate(conn: &Connection) -> Result<()> {
    let ddl: Vec<String> = Table::ALL
        .iter()
        .map(|t| t.schema().create_sql())
        .collect();
    conn.execute_batch(&ddl.join("\n"))?;
    conn.execute_batch(INDEXES)?;

    for (table, column) in ADDITIVE_COLUMNS {
        let sql = format!("ALTER TABLE {} ADD COLUMN {}", table.name(), column.definition());
        match conn.execute(&sql, []) {
            Ok(_) => tracing::info!(table = %table, column = column.name, "added column"),
            Err(e) if is_duplicate_column(&e) => {
                tracing::debug!(table = %table, column = column.name, "column already present");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

fn is_duplicate_column(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.contains("duplicate column name")
    )
}

fn quote(ident: &str) -> String {
    format!("\"{ident}\"")
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or(0.0)),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

fn key_to_sql(key: &Key) -> SqlValue {
    match key {
        Key::Int(n) => SqlValue::Integer(*n),
        Key::Text(s) => SqlValue::Text(s.clone()),
    }
}

fn from_sql(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Value::from(f),
        ValueRef::Text(t) | ValueRef::Blob(t) => Value::from(String::from_utf8_lossy(t).into_owned()),
    }
}

fn insert_row(conn: &Connection, schema: &TableSchema, record: Record) -> Result<Key> {
    let row = schema.prepare_insert(record)?;
    let columns: Vec<String> = row.keys().map(|c| quote(c)).collect();
    let placeholders: Vec<String> = (1..=row.len()).map(|i| format!("?{i}")).collect();
    let sql = format!(
        "INSERT OR REPLACE INTO {} ({}) VALUES ({})",
        schema.table.name(),
        columns.join(", "),
        placeholders.join(", ")
    );
    conn.execute(&sql, params_from_iter(row.values().map(to_sql)))?;

    Ok(match Key::of(&row) {
        Some(key) => key,
        None => Key::Int(conn.last_insert_rowid()),
    })
}

fn update_row(conn: &Connection, schema: &TableSchema, key: &Key, patch: Record) -> Result<()> {
    let patch = schema.prepare_patch(patch)?;
    if patch.is_empty() {
        return Ok(());
    }
    let assignments: Vec<String> = patch
        .keys()
        .enumerate()
        .map(|(i, c)| format!("{} = ?{}", quote(c), i + 1))
        .collect();
    let sql = format!(
        "UPDATE {} SET {} WHERE {} = ?{}",
        schema.table.name(),
        assignments.join(", "),
        PRIMARY_KEY,
        patch.len() + 1
    );
    let params = patch
        .values()
        .map(to_sql)
        .chain(std::iter::once(key_to_sql(key)));
    conn.execute(&sql, params_from_iter(params))?;
    Ok(())
}

fn select_rows(
    conn: &Connection,
    schema: &TableSchema,
    filter: &Filter,
    sort: Option<&Sort>,
) -> Result<Vec<Record>> {
    let filter = filter.resolve(schema)?;
    if let Some(sort) = sort {
        sort.validate(schema)?;
    }

    let names: Vec<&'static str> = schema.column_names().collect();
    let mut sql = format!(
        "SELECT {} FROM {}",
        names.iter().map(|c| quote(c)).collect::<Vec<_>>().join(", "),
        schema.table.name()
    );

    let mut params = Vec::new();
    let mut conditions = Vec::new();
    for (field, value) in filter.iter() {
        if value.is_null() {
            conditions.push(format!("{} IS NULL", quote(field)));
        } else {
            params.push(to_sql(value));
            conditions.push(format!("{} = ?{}", quote(field), params.len()));
        }
    }
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    match sort {
        Some(sort) => sql.push_str(&format!(
            " ORDER BY {} {}, rowid ASC",
            quote(&sort.field),
            sort.direction.as_sql()
        )),
        None => sql.push_str(" ORDER BY rowid ASC"),
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(params), |row| {
        let mut record = Record::new();
        for (idx, name) in names.iter().enumerate() {
            record.insert((*name).to_string(), from_sql(row.get_ref(idx)?));
        }
        Ok(record)
    })?;
    let records = rows.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(records)
}

impl LocalStore for SqliteStore {
    fn init(&self) -> StoreFuture<'_, ()> {
        Box::pin(self.run(|conn| migrate(conn)))
    }

    fn insert(&self, table: Table, record: Record) -> StoreFuture<'_, Key> {
        Box::pin(self.run(move |conn| insert_row(conn, table.schema(), record)))
    }

    fn update(&self, table: Table, key: Key, patch: Record) -> StoreFuture<'_, ()> {
        Box::pin(self.run(move |conn| update_row(conn, table.schema(), &key, patch)))
    }

    fn remove(&self, table: Table, key: Key) -> StoreFuture<'_, ()> {
        Box::pin(self.run(move |conn| {
            let sql = format!("DELETE FROM {} WHERE {} = ?1", table.name(), PRIMARY_KEY);
            conn.execute(&sql, [key_to_sql(&key)])?;
            Ok(())
        }))
    }

    fn query(
        &self,
        table: Table,
        filter: Filter,
        sort: Option<Sort>,
    ) -> StoreFuture<'_, Vec<Record>> {
        Box::pin(self.run(move |conn| select_rows(conn, table.schema(), &filter, sort.as_ref())))
    }

    fn clear(&self, table: Table) -> StoreFuture<'_, ()> {
        Box::pin(self.run(move |conn| {
            conn.execute(&format!("DELETE FROM {}", table.name()), [])?;
            Ok(())
        }))
    }

    fn backend(&self) -> Backend {
        Backend::Sqlite
    }
}

#[cfg(test)]
#[path = "sqlite_tests.rs"]
mod tests;
