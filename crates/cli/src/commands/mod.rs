// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod cache;
pub mod init;
pub mod participant;
pub mod personne;
pub mod session;
pub mod status;
pub mod sync;

use eq_core::{Entity, Record};
use serde::Serialize;

use crate::app::App;
use crate::error::{Error, Result};
use crate::services::EntityService;

/// Global flags every command that touches the store needs.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub directory: Option<String>,
    pub offline: bool,
    pub json: bool,
}

impl Context {
    pub async fn open(&self) -> Result<App> {
        App::open(self.directory.as_deref(), self.offline).await
    }
}

/// Builds a record from optional CLI fields, skipping absent ones.
pub(crate) fn fields_record(fields: Vec<(&str, Option<String>)>) -> Record {
    fields
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name.to_string(), v.into())))
        .collect()
}

/// Rejects an edit that would change nothing.
pub(crate) fn require_patch(patch: &Record) -> Result<()> {
    if patch.is_empty() {
        return Err(Error::EmptyPatch);
    }
    Ok(())
}

/// Fails with `NotFound` unless a record with this id exists. Blank ids
/// are left for the service to reject.
pub(crate) async fn ensure_exists<E: Entity>(
    service: &EntityService<E>,
    kind: &'static str,
    id: &str,
) -> Result<()> {
    if !id.trim().is_empty() && service.get(id).await?.is_none() {
        return Err(Error::NotFound {
            kind,
            id: id.to_string(),
        });
    }
    Ok(())
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Line appended after a write that only reached the local store.
pub(crate) fn queued_note(synced: Option<i64>) -> &'static str {
    if synced == Some(0) {
        " (saved locally, queued for sync)"
    } else {
        ""
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;
