// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

pub fn enq() -> Command {
    let mut cmd = cargo_bin_cmd!("enq");
    cmd.env("NO_COLOR", "1").env_remove("ENQ_LOG");
    cmd
}

/// An initialized temp directory without a remote.
pub fn init_temp() -> TempDir {
    let temp = TempDir::new().unwrap();
    enq()
        .arg("init")
        .current_dir(temp.path())
        .assert()
        .success();
    temp
}

/// Runs a command that prints `Created <kind> <id>` and returns the id.
pub fn create(temp: &TempDir, args: &[&str]) -> String {
    let output = enq().args(args).current_dir(temp.path()).output().unwrap();
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout)
        .split_whitespace()
        .nth(2)
        .unwrap()
        .to_string()
}

pub fn add_participant(temp: &TempDir, nom: &str) -> String {
    create(temp, &["participant", "add", nom])
}

pub fn add_session(temp: &TempDir, localite: &str, debut: &str, fin: &str) -> String {
    create(
        temp,
        &[
            "session", "add", "--localite", localite, "--debut", debut, "--fin", fin,
        ],
    )
}
