// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::error::Error;
use tempfile::TempDir;

#[tokio::test]
async fn test_init_creates_config_and_store() {
    let dir = TempDir::new().unwrap();
    let (work_dir, config) = init_impl(dir.path(), Backend::Sqlite, None, None)
        .await
        .unwrap();
    assert!(work_dir.join("config.toml").exists());
    assert!(work_dir.join("enquete.db").exists());
    assert_eq!(Config::load(&work_dir).unwrap(), config);
}

#[tokio::test]
async fn test_init_document_backend_with_remote() {
    let dir = TempDir::new().unwrap();
    let (work_dir, config) = init_impl(
        dir.path(),
        Backend::Document,
        Some("ws://127.0.0.1:7890".into()),
        None,
    )
    .await
    .unwrap();
    assert!(work_dir.join("store").is_dir());
    assert_eq!(config.remote_url(), Some("ws://127.0.0.1:7890"));
}

#[tokio::test]
async fn test_init_custom_store_path() {
    let dir = TempDir::new().unwrap();
    init_impl(dir.path(), Backend::Sqlite, None, Some("data/survey.db".into()))
        .await
        .unwrap();
    assert!(dir.path().join("data/survey.db").exists());
}

#[tokio::test]
async fn test_init_twice_fails() {
    let dir = TempDir::new().unwrap();
    init_impl(dir.path(), Backend::Sqlite, None, None)
        .await
        .unwrap();
    let err = init_impl(dir.path(), Backend::Sqlite, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::AlreadyInitialized(_)));
}

#[tokio::test]
async fn test_init_rejects_http_remote() {
    let dir = TempDir::new().unwrap();
    let err = init_impl(
        dir.path(),
        Backend::Sqlite,
        Some("http://example.com".into()),
        None,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(!dir.path().join(".enquete").exists());
}
