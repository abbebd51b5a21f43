// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

//! Test infrastructure for command testing without a project directory.
//!
//! `TestContext` wires the services over an in-memory SQLite store, an
//! in-memory remote and a connectivity switch.

use std::sync::Arc;

use eq_core::{SqliteStore, StoreHandle};
use serde_json::json;

use super::*;
use crate::services::Services;
use crate::sync::test_helpers::MemoryRemote;
use crate::sync::ManualConnectivity;

pub struct TestContext {
    pub services: Services,
    pub remote: Arc<MemoryRemote>,
    pub connectivity: Arc<ManualConnectivity>,
}

impl TestContext {
    /// A context whose device starts offline.
    pub async fn new() -> Self {
        Self::with_online(false).await
    }

    pub async fn online() -> Self {
        Self::with_online(true).await
    }

    async fn with_online(online: bool) -> Self {
        let store = StoreHandle::new();
        store
            .initialize(Arc::new(
                SqliteStore::open_in_memory().expect("in-memory store"),
            ))
            .await
            .expect("initialize store");
        let remote = MemoryRemote::new();
        let connectivity = Arc::new(ManualConnectivity::new(online));
        let services = Services::new(store, remote.clone(), connectivity.clone());
        TestContext {
            services,
            remote,
            connectivity,
        }
    }
}

#[test]
fn fields_record_skips_absent_fields() {
    let record = fields_record(vec![
        ("nom", Some("Kouassi".to_string())),
        ("sexe", None),
    ]);
    assert_eq!(serde_json::Value::Object(record), json!({"nom": "Kouassi"}));
}

#[test]
fn empty_patch_is_rejected() {
    assert!(matches!(
        require_patch(&Record::new()),
        Err(Error::EmptyPatch)
    ));
    assert!(require_patch(&fields_record(vec![("nom", Some("x".into()))])).is_ok());
}

#[test]
fn queued_note_only_for_unsynced() {
    assert_eq!(queued_note(Some(0)), " (saved locally, queued for sync)");
    assert_eq!(queued_note(Some(1)), "");
    assert_eq!(queued_note(None), "");
}

#[tokio::test]
async fn ensure_exists_reports_kind_and_id() {
    let ctx = TestContext::new().await;
    let err = ensure_exists(&ctx.services.participants, "participant", "u9")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "participant not found: u9");
    // Blank ids are left for the service to reject.
    assert!(ensure_exists(&ctx.services.participants, "participant", " ")
        .await
        .is_ok());
}
