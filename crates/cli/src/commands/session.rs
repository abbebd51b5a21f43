// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use eq_core::{Filter, Record, Session};

use super::{ensure_exists, fields_record, print_json, queued_note, require_patch, Context};
use crate::cli::{SessionCommand, SessionFields};
use crate::display::format_session_line;
use crate::error::Result;
use crate::services::Services;

pub async fn run(ctx: &Context, cmd: SessionCommand) -> Result<()> {
    let app = ctx.open().await?;
    let services = &app.services;
    match cmd {
        SessionCommand::Add { fields } => add_impl(services, fields, ctx.json).await.map(|_| ()),
        SessionCommand::List => list_impl(services, ctx.json).await.map(|_| ()),
        SessionCommand::Edit { id, fields } => edit_impl(services, &id, fields).await,
        SessionCommand::Rm { id } => rm_impl(services, &id).await,
    }
}

fn session_record(fields: SessionFields) -> Record {
    fields_record(vec![
        ("localite_activite", fields.localite_activite),
        ("date_debut", fields.date_debut),
        ("date_fin", fields.date_fin),
    ])
}

pub(crate) async fn add_impl(
    services: &Services,
    fields: SessionFields,
    json: bool,
) -> Result<Session> {
    let created = services.sessions.create(session_record(fields)).await?;
    if json {
        print_json(&created)?;
    } else {
        println!(
            "Created session {}{}",
            created.id,
            queued_note(created.synced)
        );
    }
    Ok(created)
}

pub(crate) async fn list_impl(services: &Services, json: bool) -> Result<Vec<Session>> {
    let sessions = services.sessions.read_all(Filter::new()).await?;
    if json {
        print_json(&sessions)?;
    } else {
        for s in &sessions {
            println!("{}", format_session_line(s));
        }
    }
    Ok(sessions)
}

pub(crate) async fn edit_impl(services: &Services, id: &str, fields: SessionFields) -> Result<()> {
    let patch = session_record(fields);
    require_patch(&patch)?;
    ensure_exists(&services.sessions, "session", id).await?;
    services.sessions.update(id, patch).await?;
    println!("Updated session {}", id);
    Ok(())
}

pub(crate) async fn rm_impl(services: &Services, id: &str) -> Result<()> {
    ensure_exists(&services.sessions, "session", id).await?;
    services.sessions.delete(id).await?;
    println!("Deleted session {}", id);
    Ok(())
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
