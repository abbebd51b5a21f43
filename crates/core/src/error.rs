// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for eq-core operations.

use thiserror::Error;

/// All possible errors that can occur in eq-core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A required field is missing or blank. The message is user-facing.
    #[error("{0}")]
    Validation(String),

    #[error("unknown column '{column}' in table '{table}'")]
    UnknownColumn { table: String, column: String },

    #[error("invalid order clause: '{0}'\n  hint: expected 'ORDER BY <field> <ASC|DESC>'")]
    InvalidOrder(String),

    #[error("invalid action: '{0}'\n  hint: valid actions are: create, update, delete")]
    InvalidAction(String),

    #[error("record for table '{table}' has no primary key")]
    MissingKey { table: String },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),

    #[error("store lock poisoned")]
    LockPoisoned,

    #[error("store task failed: {0}")]
    Task(String),

    #[error("store is locked by another process: {0}\n  hint: only one writer per device is supported")]
    StoreLocked(String),
}

impl Error {
    /// Returns true for errors raised at the validation boundary.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

/// A specialized Result type for eq-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
