// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use clap::Parser;
use tempfile::TempDir;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("enq").chain(args.iter().copied())).unwrap()
}

#[tokio::test]
async fn test_init_then_add_through_run() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().to_str().unwrap();

    run(parse(&["-C", root, "init"])).await.unwrap();
    run(parse(&["-C", root, "participant", "add", "Famille X"]))
        .await
        .unwrap();

    let app = App::open(Some(root), false).await.unwrap();
    assert_eq!(app.services.queue.len().await.unwrap(), 1);
}

#[tokio::test]
async fn test_commands_outside_project_fail() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().to_str().unwrap();
    let err = run(parse(&["-C", root, "status"])).await.unwrap_err();
    assert!(matches!(err, Error::NotInitialized));
}

#[tokio::test]
async fn test_sync_without_remote_fails() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().to_str().unwrap();
    run(parse(&["-C", root, "init"])).await.unwrap();
    let err = run(parse(&["-C", root, "sync"])).await.unwrap_err();
    assert!(matches!(err, Error::Remote(_)));
}
