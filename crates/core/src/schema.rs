// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Static table layout shared by every storage backend.
//!
//! Both backends project records onto the declared columns and normalize
//! values by column kind, which is what keeps their results identical.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::record::Record;

/// Name of the primary key column in every table.
pub const PRIMARY_KEY: &str = "id";

/// A local table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Participants,
    Sessions,
    Personnes,
    SessionParticipants,
    SyncQueue,
}

impl Table {
    /// Every table, in creation order.
    pub const ALL: [Table; 5] = [
        Table::Participants,
        Table::Sessions,
        Table::Personnes,
        Table::SessionParticipants,
        Table::SyncQueue,
    ];

    /// Tables holding entity records (everything but the queue).
    pub const ENTITIES: [Table; 4] = [
        Table::Participants,
        Table::Sessions,
        Table::Personnes,
        Table::SessionParticipants,
    ];

    /// Local table name.
    pub fn name(self) -> &'static str {
        match self {
            Table::Participants => "participants",
            Table::Sessions => "sessions",
            Table::Personnes => "personnes",
            Table::SessionParticipants => "session_participants",
            Table::SyncQueue => "sync_queue",
        }
    }

    /// Table name on the remote backend.
    pub fn remote_name(self) -> &'static str {
        match self {
            Table::Participants => "participants",
            Table::Sessions => "sessions_messianisme",
            Table::Personnes => "personnes_temoignees",
            Table::SessionParticipants => "session_participants",
            Table::SyncQueue => "sync_queue",
        }
    }

    /// Resolves a remote table name (as recorded in queue entries).
    pub fn from_remote_name(name: &str) -> Option<Table> {
        Table::ALL.into_iter().find(|t| t.remote_name() == name)
    }

    /// Column layout for this table.
    pub fn schema(self) -> &'static TableSchema {
        match self {
            Table::Participants => &PARTICIPANTS,
            Table::Sessions => &SESSIONS,
            Table::Personnes => &PERSONNES,
            Table::SessionParticipants => &SESSION_PARTICIPANTS,
            Table::SyncQueue => &SYNC_QUEUE,
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Table {
    type Err = Error;

    /// Accepts local or remote table names.
    fn from_str(s: &str) -> Result<Self> {
        Table::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .or_else(|| Table::from_remote_name(s))
            .ok_or_else(|| Error::CorruptedData(format!("unknown table '{s}'")))
    }
}

/// Storage class of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
}

impl ColumnKind {
    fn sql(self) -> &'static str {
        match self {
            ColumnKind::Text => "TEXT",
            ColumnKind::Integer => "INTEGER",
        }
    }
}

/// Value a column takes when an insert omits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnDefault {
    Integer(i64),
    /// SQLite's `CURRENT_TIMESTAMP` (`YYYY-MM-DD HH:MM:SS`, UTC).
    CurrentTimestamp,
}

impl ColumnDefault {
    fn sql(self) -> String {
        match self {
            ColumnDefault::Integer(n) => n.to_string(),
            ColumnDefault::CurrentTimestamp => "CURRENT_TIMESTAMP".to_string(),
        }
    }

    /// Materializes the default the way SQLite would.
    pub fn value(self) -> Value {
        match self {
            ColumnDefault::Integer(n) => Value::from(n),
            ColumnDefault::CurrentTimestamp => Value::from(
                chrono::Utc::now()
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string(),
            ),
        }
    }
}

/// One declared column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub not_null: bool,
    pub default: Option<ColumnDefault>,
}

impl Column {
    const fn text(name: &'static str) -> Self {
        Column {
            name,
            kind: ColumnKind::Text,
            not_null: false,
            default: None,
        }
    }

    const fn required(name: &'static str) -> Self {
        Column {
            name,
            kind: ColumnKind::Text,
            not_null: true,
            default: None,
        }
    }

    const fn integer(name: &'static str, default: i64) -> Self {
        Column {
            name,
            kind: ColumnKind::Integer,
            not_null: false,
            default: Some(ColumnDefault::Integer(default)),
        }
    }

    /// Column definition as it appears in `CREATE TABLE` / `ADD COLUMN`.
    pub fn definition(&self) -> String {
        let mut line = format!("{} {}", self.name, self.kind.sql());
        if self.not_null {
            line.push_str(" NOT NULL");
        }
        if let Some(default) = self.default {
            line.push_str(&format!(" DEFAULT {}", default.sql()));
        }
        line
    }

    /// Coerces a value the way SQLite column affinity would store it.
    pub fn normalize(&self, value: Value) -> Value {
        match (self.kind, value) {
            (_, Value::Null) => Value::Null,
            (ColumnKind::Integer, Value::Bool(b)) => Value::from(i64::from(b)),
            (ColumnKind::Integer, Value::String(s)) => match s.trim().parse::<i64>() {
                Ok(n) => Value::from(n),
                Err(_) => Value::String(s),
            },
            (ColumnKind::Integer, v @ Value::Number(_)) => v,
            (ColumnKind::Text, Value::Bool(b)) => Value::from(i64::from(b).to_string()),
            (ColumnKind::Text, Value::Number(n)) => Value::from(n.to_string()),
            (ColumnKind::Text, v @ Value::String(_)) => v,
            (_, v @ (Value::Array(_) | Value::Object(_))) => Value::from(v.to_string()),
        }
    }
}

/// How the primary key is assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryKey {
    /// Client-assigned text key (UUIDv4 for entities).
    Text,
    /// Store-assigned, monotonically increasing, never reused.
    AutoIncrement,
}

/// Column layout of one table. The primary key column is always `id`.
#[derive(Debug)]
pub struct TableSchema {
    pub table: Table,
    pub primary_key: PrimaryKey,
    /// Non-key columns, in declaration order.
    pub columns: &'static [Column],
}

impl TableSchema {
    /// Looks up a non-key column.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Key and column names, in storage order.
    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(PRIMARY_KEY).chain(self.columns.iter().map(|c| c.name))
    }

    /// Returns true if `name` is the key or a declared column.
    pub fn has_column(&self, name: &str) -> bool {
        name == PRIMARY_KEY || self.column(name).is_some()
    }

    /// Rejects names that are not declared columns of this table.
    pub fn check_column(&self, name: &str) -> Result<()> {
        if self.has_column(name) {
            Ok(())
        } else {
            Err(Error::UnknownColumn {
                table: self.table.name().to_string(),
                column: name.to_string(),
            })
        }
    }

    /// Normalizes a value destined for `name` (key or column).
    pub fn normalize(&self, name: &str, value: Value) -> Value {
        if name == PRIMARY_KEY {
            return match (self.primary_key, value) {
                (PrimaryKey::AutoIncrement, v) => Column::integer(PRIMARY_KEY, 0).normalize(v),
                (PrimaryKey::Text, v) => Column::text(PRIMARY_KEY).normalize(v),
            };
        }
        match self.column(name) {
            Some(column) => column.normalize(value),
            None => value,
        }
    }

    /// Builds the full row stored for an insert.
    ///
    /// Unknown fields are dropped, values normalized, defaults filled in and
    /// NOT NULL columns checked. The key is kept only when present.
    pub fn prepare_insert(&self, mut record: Record) -> Result<Record> {
        let mut row = Record::new();

        match record.remove(PRIMARY_KEY) {
            Some(Value::Null) | None => {
                if self.primary_key == PrimaryKey::Text {
                    return Err(Error::MissingKey {
                        table: self.table.name().to_string(),
                    });
                }
            }
            Some(key) => {
                row.insert(PRIMARY_KEY.to_string(), self.normalize(PRIMARY_KEY, key));
            }
        }

        for column in self.columns {
            let value = match record.remove(column.name) {
                Some(Value::Null) | None => column.default.map_or(Value::Null, |d| d.value()),
                Some(v) => column.normalize(v),
            };
            if column.not_null && value.is_null() {
                return Err(self.not_null_violation(column.name));
            }
            row.insert(column.name.to_string(), value);
        }

        if !record.is_empty() {
            let dropped: Vec<&String> = record.keys().collect();
            tracing::debug!(table = %self.table, ?dropped, "dropping undeclared fields");
        }

        Ok(row)
    }

    /// Builds the column assignments for a partial update.
    ///
    /// The key is never rewritten; unknown fields are dropped.
    pub fn prepare_patch(&self, patch: Record) -> Result<Record> {
        let mut out = Record::new();
        for (name, value) in patch {
            let Some(column) = self.column(&name) else {
                if name != PRIMARY_KEY {
                    tracing::debug!(table = %self.table, field = %name, "dropping undeclared field");
                }
                continue;
            };
            let value = column.normalize(value);
            if column.not_null && value.is_null() {
                return Err(self.not_null_violation(column.name));
            }
            out.insert(name, value);
        }
        Ok(out)
    }

    fn not_null_violation(&self, column: &str) -> Error {
        Error::CorruptedData(format!(
            "NOT NULL constraint failed: {}.{column}",
            self.table.name()
        ))
    }

    /// `CREATE TABLE IF NOT EXISTS` statement for this table.
    pub fn create_sql(&self) -> String {
        let key = match self.primary_key {
            PrimaryKey::Text => "id TEXT PRIMARY KEY".to_string(),
            PrimaryKey::AutoIncrement => "id INTEGER PRIMARY KEY AUTOINCREMENT".to_string(),
        };
        let mut lines = vec![key];
        lines.extend(self.columns.iter().map(Column::definition));
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n);",
            self.table.name(),
            lines.join(",\n    ")
        )
    }
}

/// Columns added after the first schema release, applied to older stores.
pub const ADDITIVE_COLUMNS: &[(Table, Column)] = &[(Table::Personnes, Column::text("local_id"))];

static PARTICIPANTS: TableSchema = TableSchema {
    table: Table::Participants,
    primary_key: PrimaryKey::Text,
    columns: &[
        Column::required("nom"),
        Column::text("created_at"),
        Column::text("updated_at"),
        Column::integer("synced", 0),
    ],
};

static SESSIONS: TableSchema = TableSchema {
    table: Table::Sessions,
    primary_key: PrimaryKey::Text,
    columns: &[
        Column::required("localite_activite"),
        Column::required("date_debut"),
        Column::required("date_fin"),
        Column::text("created_at"),
        Column::text("updated_at"),
        Column::integer("synced", 0),
    ],
};

static PERSONNES: TableSchema = TableSchema {
    table: Table::Personnes,
    primary_key: PrimaryKey::Text,
    columns: &[
        Column::required("nom"),
        Column::required("prenoms"),
        Column::text("date_naissance"),
        Column::text("situation_matrimoniale"),
        Column::text("partenaire_id"),
        Column::text("sexe"),
        Column::text("ville_village"),
        Column::text("occupation"),
        Column::text("numero_telephone"),
        Column::required("session_id"),
        Column::required("participant_id"),
        Column::text("created_at"),
        Column::text("updated_at"),
        Column::integer("synced", 0),
        Column::text("local_id"),
    ],
};

static SESSION_PARTICIPANTS: TableSchema = TableSchema {
    table: Table::SessionParticipants,
    primary_key: PrimaryKey::Text,
    columns: &[
        Column::required("session_id"),
        Column::required("participant_id"),
        Column::text("created_at"),
        Column::integer("synced", 0),
    ],
};

static SYNC_QUEUE: TableSchema = TableSchema {
    table: Table::SyncQueue,
    primary_key: PrimaryKey::AutoIncrement,
    columns: &[
        Column::required("table_name"),
        Column::required("record_id"),
        Column::required("action"),
        Column::text("data"),
        Column {
            name: "created_at",
            kind: ColumnKind::Text,
            not_null: false,
            default: Some(ColumnDefault::CurrentTimestamp),
        },
        Column::integer("retry_count", 0),
    ],
};

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
