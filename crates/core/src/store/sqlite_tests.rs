// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use serde_json::json;
use tempfile::TempDir;

fn column_names(conn: &Connection, table: &str) -> Vec<String> {
    let mut stmt = conn
        .prepare(&format!("SELECT name FROM pragma_table_info('{table}')"))
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<std::result::Result<_, _>>()
        .unwrap()
}

#[test]
fn migrate_creates_every_table() {
    let conn = Connection::open_in_memory().unwrap();
    migrate(&conn).unwrap();
    for table in Table::ALL {
        assert!(
            !column_names(&conn, table.name()).is_empty(),
            "missing table {table}"
        );
    }
}

#[test]
fn migrate_twice_tolerates_existing_column() {
    let conn = Connection::open_in_memory().unwrap();
    migrate(&conn).unwrap();
    migrate(&conn).unwrap();
    let names = column_names(&conn, "personnes");
    assert_eq!(names.iter().filter(|n| *n == "local_id").count(), 1);
}

#[test]
fn migrate_adds_local_id_to_old_personnes_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE personnes (
            id TEXT PRIMARY KEY,
            nom TEXT NOT NULL,
            prenoms TEXT NOT NULL,
            session_id TEXT NOT NULL,
            participant_id TEXT NOT NULL
        );
        INSERT INTO personnes VALUES ('p1', 'N', 'P', 's1', 'u1');",
    )
    .unwrap();

    migrate(&conn).unwrap();

    assert!(column_names(&conn, "personnes").contains(&"local_id".to_string()));
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM personnes", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn duplicate_column_detection_is_specific() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE t (a TEXT);").unwrap();

    let dup = conn.execute("ALTER TABLE t ADD COLUMN a TEXT", []).unwrap_err();
    assert!(is_duplicate_column(&dup));

    let missing = conn
        .execute("ALTER TABLE nope ADD COLUMN a TEXT", [])
        .unwrap_err();
    assert!(!is_duplicate_column(&missing));
}

#[tokio::test]
async fn file_store_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("enquete.db");

    {
        let store = SqliteStore::open(&path).unwrap();
        store.init().await.unwrap();
        store
            .insert(
                Table::Participants,
                json!({"id": "u1", "nom": "Famille X"}).as_object().unwrap().clone(),
            )
            .await
            .unwrap();
    }

    let store = SqliteStore::open(&path).unwrap();
    store.init().await.unwrap();
    let rows = store
        .query(Table::Participants, Filter::new(), None)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["nom"], json!("Famille X"));
}

#[tokio::test]
async fn not_null_violation_surfaces_as_error() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.init().await.unwrap();
    let err = store
        .insert(
            Table::Participants,
            json!({"id": "u1"}).as_object().unwrap().clone(),
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("participants.nom"));
}
