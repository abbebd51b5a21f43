// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

mod common;
use common::*;
use serde_json::Value;

fn json(temp: &TempDir, args: &[&str]) -> Value {
    let output = enq()
        .args(["-o", "json"])
        .args(args)
        .current_dir(temp.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn list_json_carries_sync_marker() {
    let temp = init_temp();
    add_participant(&temp, "Famille X");
    let list = json(&temp, &["participant", "list"]);
    let rows = list.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["nom"], "Famille X");
    assert_eq!(rows[0]["synced"], 0);
}

#[test]
fn status_json_reports_pending_and_counts() {
    let temp = init_temp();
    add_participant(&temp, "Famille X");
    add_participant(&temp, "Famille Y");

    let status = json(&temp, &["status"]);
    assert_eq!(status["remote"], Value::Null);
    assert_eq!(status["is_online"], false);
    assert_eq!(status["pending"], 2);
    assert_eq!(status["records"]["participants"], 2);
    assert!(status["records"].get("sync_queue").is_none());
}

#[test]
fn status_text() {
    let temp = init_temp();
    enq()
        .arg("status")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Pending changes: 0"))
        .stdout(predicate::str::contains("Last sync: never"));
}

#[test]
fn completion_generates_script() {
    enq()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("enq"));
}
