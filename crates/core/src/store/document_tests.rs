// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use serde_json::json;
use tempfile::TempDir;

fn rec(value: Value) -> Record {
    value.as_object().unwrap().clone()
}

#[tokio::test]
async fn init_creates_a_file_per_table() {
    let dir = TempDir::new().unwrap();
    let store = DocumentStore::open(dir.path()).unwrap();
    store.init().await.unwrap();

    for table in Table::ALL {
        assert!(table_path(dir.path(), table).exists(), "missing {table}");
    }
    assert!(dir.path().join(LOCK_FILE).exists());
}

#[tokio::test]
async fn records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let store = DocumentStore::open(dir.path()).unwrap();
        store.init().await.unwrap();
        store
            .insert(Table::Participants, rec(json!({"id": "u1", "nom": "Famille X"})))
            .await
            .unwrap();
        store
            .insert(Table::SyncQueue, rec(json!({"table_name": "participants", "record_id": "u1", "action": "create"})))
            .await
            .unwrap();
        store.clear(Table::SyncQueue).await.unwrap();
    }

    let store = DocumentStore::open(dir.path()).unwrap();
    let rows = store
        .query(Table::Participants, Filter::new(), None)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["nom"], json!("Famille X"));

    // The sequence outlives the cleared queue.
    let key = store
        .insert(Table::SyncQueue, rec(json!({"table_name": "participants", "record_id": "u2", "action": "create"})))
        .await
        .unwrap();
    assert_eq!(key, Key::Int(2));
}

#[test]
fn second_open_is_refused_while_locked() {
    let dir = TempDir::new().unwrap();
    let _first = DocumentStore::open(dir.path()).unwrap();
    let err = DocumentStore::open(dir.path()).err().unwrap();
    assert!(matches!(err, Error::StoreLocked(_)));
}

#[tokio::test]
async fn rows_written_by_older_schema_gain_new_columns() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        table_path(dir.path(), Table::Personnes),
        "{\"id\":\"p1\",\"nom\":\"N\",\"prenoms\":\"P\",\"session_id\":\"s1\",\"participant_id\":\"u1\",\"synced\":true}\n",
    )
    .unwrap();

    let store = DocumentStore::open(dir.path()).unwrap();
    store.init().await.unwrap();
    let rows = store
        .query(Table::Personnes, Filter::new(), None)
        .await
        .unwrap();
    assert_eq!(rows[0]["local_id"], Value::Null);
    assert_eq!(rows[0]["synced"], json!(1));
}

#[tokio::test]
async fn in_memory_store_writes_nothing() {
    let store = DocumentStore::in_memory();
    store.init().await.unwrap();
    store
        .insert(Table::Participants, rec(json!({"id": "u1", "nom": "A"})))
        .await
        .unwrap();
    assert_eq!(store.backend(), Backend::Document);
}

#[tokio::test]
async fn failed_write_leaves_the_table_unchanged() {
    let dir = TempDir::new().unwrap();
    let store = DocumentStore::open(dir.path()).unwrap();
    store.init().await.unwrap();
    store
        .insert(Table::Participants, rec(json!({"id": "u1", "nom": "A"})))
        .await
        .unwrap();

    // The temp file cannot be created while a directory holds its name.
    let blocker = dir.path().join("participants.jsonl.tmp");
    fs::create_dir(&blocker).unwrap();

    assert!(store
        .insert(Table::Participants, rec(json!({"id": "u2", "nom": "B"})))
        .await
        .is_err());
    assert!(store
        .update(Table::Participants, Key::from("u1"), rec(json!({"nom": "Z"})))
        .await
        .is_err());
    assert!(store.remove(Table::Participants, Key::from("u1")).await.is_err());
    assert!(store.clear(Table::Participants).await.is_err());

    let rows = store
        .query(Table::Participants, Filter::new(), None)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["nom"], json!("A"));

    fs::remove_dir(&blocker).unwrap();
    store
        .insert(Table::Participants, rec(json!({"id": "u3", "nom": "C"})))
        .await
        .unwrap();
    drop(store);
    let reopened = DocumentStore::open(dir.path()).unwrap();
    let ids: Vec<Value> = reopened
        .query(Table::Participants, Filter::new(), None)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r["id"].clone())
        .collect();
    assert_eq!(ids, vec![json!("u1"), json!("u3")]);
}
