// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use eq_core::{Filter, Participant};

use super::{ensure_exists, fields_record, print_json, queued_note, require_patch, Context};
use crate::cli::ParticipantCommand;
use crate::display::format_participant_line;
use crate::error::Result;
use crate::services::Services;

pub async fn run(ctx: &Context, cmd: ParticipantCommand) -> Result<()> {
    let app = ctx.open().await?;
    let services = &app.services;
    match cmd {
        ParticipantCommand::Add { nom } => add_impl(services, nom, ctx.json).await.map(|_| ()),
        ParticipantCommand::List => list_impl(services, ctx.json).await.map(|_| ()),
        ParticipantCommand::Edit { id, nom } => edit_impl(services, &id, nom).await,
        ParticipantCommand::Rm { id } => rm_impl(services, &id).await,
    }
}

pub(crate) async fn add_impl(services: &Services, nom: String, json: bool) -> Result<Participant> {
    let record = fields_record(vec![("nom", Some(nom))]);
    let created = services.participants.create(record).await?;
    if json {
        print_json(&created)?;
    } else {
        println!(
            "Created participant {}{}",
            created.id,
            queued_note(created.synced)
        );
    }
    Ok(created)
}

pub(crate) async fn list_impl(services: &Services, json: bool) -> Result<Vec<Participant>> {
    let participants = services.participants.read_all(Filter::new()).await?;
    if json {
        print_json(&participants)?;
    } else {
        for p in &participants {
            println!("{}", format_participant_line(p));
        }
    }
    Ok(participants)
}

pub(crate) async fn edit_impl(services: &Services, id: &str, nom: Option<String>) -> Result<()> {
    let patch = fields_record(vec![("nom", nom)]);
    require_patch(&patch)?;
    ensure_exists(&services.participants, "participant", id).await?;
    services.participants.update(id, patch).await?;
    println!("Updated participant {}", id);
    Ok(())
}

pub(crate) async fn rm_impl(services: &Services, id: &str) -> Result<()> {
    ensure_exists(&services.participants, "participant", id).await?;
    services.participants.delete(id).await?;
    println!("Deleted participant {}", id);
    Ok(())
}

#[cfg(test)]
#[path = "participant_tests.rs"]
mod tests;
