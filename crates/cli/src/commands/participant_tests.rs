// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::commands::testing::TestContext;
use crate::error::Error;
use eq_core::Table;

#[tokio::test]
async fn test_add_offline_queues_create() {
    let ctx = TestContext::new().await;
    let created = add_impl(&ctx.services, "Famille X".into(), false)
        .await
        .unwrap();
    assert_eq!(created.synced, Some(0));
    assert_eq!(ctx.services.queue.len().await.unwrap(), 1);
    assert!(ctx.remote.calls().is_empty());
}

#[tokio::test]
async fn test_add_online_reaches_remote() {
    let ctx = TestContext::online().await;
    let created = add_impl(&ctx.services, "Famille X".into(), true)
        .await
        .unwrap();
    assert!(ctx.remote.get(Table::Participants, &created.id).is_some());
    assert!(ctx.services.queue.is_empty().await.unwrap());
}

#[tokio::test]
async fn test_list_sorted_by_name() {
    let ctx = TestContext::new().await;
    for nom in ["Zadi", "Aka", "Kone"] {
        add_impl(&ctx.services, nom.into(), false).await.unwrap();
    }
    let names: Vec<String> = list_impl(&ctx.services, false)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.nom)
        .collect();
    assert_eq!(names, vec!["Aka", "Kone", "Zadi"]);
}

#[tokio::test]
async fn test_edit_renames() {
    let ctx = TestContext::new().await;
    let created = add_impl(&ctx.services, "Famille X".into(), false)
        .await
        .unwrap();
    edit_impl(&ctx.services, &created.id, Some("Famille Y".into()))
        .await
        .unwrap();
    let got = ctx.services.participants.get(&created.id).await.unwrap().unwrap();
    assert_eq!(got.nom, "Famille Y");
}

#[tokio::test]
async fn test_edit_without_fields_is_rejected() {
    let ctx = TestContext::new().await;
    let err = edit_impl(&ctx.services, "u1", None).await.unwrap_err();
    assert!(matches!(err, Error::EmptyPatch));
}

#[tokio::test]
async fn test_edit_blank_name_fails_validation() {
    let ctx = TestContext::new().await;
    let created = add_impl(&ctx.services, "Famille X".into(), false)
        .await
        .unwrap();
    let err = edit_impl(&ctx.services, &created.id, Some(" ".into()))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Le nom est requis");
}

#[tokio::test]
async fn test_rm_unknown_id() {
    let ctx = TestContext::new().await;
    let err = rm_impl(&ctx.services, "missing").await.unwrap_err();
    assert!(matches!(err, Error::NotFound { kind: "participant", .. }));
}

#[tokio::test]
async fn test_rm_removes_locally_and_queues_delete() {
    let ctx = TestContext::new().await;
    let created = add_impl(&ctx.services, "Famille X".into(), false)
        .await
        .unwrap();
    rm_impl(&ctx.services, &created.id).await.unwrap();
    assert!(list_impl(&ctx.services, false).await.unwrap().is_empty());
    // create + delete, replayed in order
    assert_eq!(ctx.services.queue.len().await.unwrap(), 2);
}
