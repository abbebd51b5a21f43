// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// All possible errors that can occur in the eqrs library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not initialized: run 'enq init' first")]
    NotInitialized,

    #[error("already initialized at {0}")]
    AlreadyInitialized(String),

    /// A required field is missing or blank. The message is user-facing.
    #[error("{0}")]
    Validation(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("nothing to change\n  hint: pass at least one field to update")]
    EmptyPatch,

    #[error("refusing to clear the local cache without confirmation\n  hint: re-run with --yes")]
    ConfirmationRequired,

    #[error("config error: {0}")]
    Config(String),

    #[error("remote error: {0}")]
    Remote(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Store(eq_core::Error),
}

/// A specialized Result type for eqrs operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<eq_core::Error> for Error {
    fn from(e: eq_core::Error) -> Self {
        match e {
            eq_core::Error::Validation(message) => Error::Validation(message),
            eq_core::Error::Io(e) => Error::Io(e),
            eq_core::Error::Json(e) => Error::Json(e),
            other => Error::Store(other),
        }
    }
}

impl From<crate::sync::RemoteError> for Error {
    fn from(e: crate::sync::RemoteError) -> Self {
        Error::Remote(e.to_string())
    }
}

impl Error {
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
