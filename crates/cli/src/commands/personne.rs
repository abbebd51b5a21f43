// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use eq_core::{Filter, Personne, Record};

use super::{ensure_exists, fields_record, print_json, queued_note, require_patch, Context};
use crate::cli::{PersonneCommand, PersonneFields};
use crate::display::format_personne_line;
use crate::error::Result;
use crate::services::Services;

pub async fn run(ctx: &Context, cmd: PersonneCommand) -> Result<()> {
    let app = ctx.open().await?;
    let services = &app.services;
    match cmd {
        PersonneCommand::Add { fields } => add_impl(services, fields, ctx.json).await.map(|_| ()),
        PersonneCommand::List {
            session,
            participant,
        } => list_impl(services, session, participant, ctx.json)
            .await
            .map(|_| ()),
        PersonneCommand::Edit { id, fields } => edit_impl(services, &id, fields).await,
        PersonneCommand::Rm { id } => rm_impl(services, &id).await,
    }
}

fn personne_record(fields: PersonneFields) -> Record {
    fields_record(vec![
        ("session_id", fields.session_id),
        ("participant_id", fields.participant_id),
        ("nom", fields.nom),
        ("prenoms", fields.prenoms),
        ("date_naissance", fields.date_naissance),
        ("situation_matrimoniale", fields.situation_matrimoniale),
        ("partenaire_id", fields.partenaire_id),
        ("sexe", fields.sexe),
        ("ville_village", fields.ville_village),
        ("occupation", fields.occupation),
        ("numero_telephone", fields.numero_telephone),
    ])
}

pub(crate) async fn add_impl(
    services: &Services,
    fields: PersonneFields,
    json: bool,
) -> Result<Personne> {
    let created = services.personnes.create(personne_record(fields)).await?;
    if json {
        print_json(&created)?;
    } else {
        println!(
            "Created personne {}{}",
            created.id,
            queued_note(created.synced)
        );
    }
    Ok(created)
}

pub(crate) async fn list_impl(
    services: &Services,
    session: Option<String>,
    participant: Option<String>,
    json: bool,
) -> Result<Vec<Personne>> {
    let filter = Filter::new()
        .eq_opt("session_id", session)
        .eq_opt("participant_id", participant);
    let personnes = services.personnes.read_all(filter).await?;
    if json {
        print_json(&personnes)?;
    } else {
        for p in &personnes {
            println!("{}", format_personne_line(p));
        }
    }
    Ok(personnes)
}

pub(crate) async fn edit_impl(services: &Services, id: &str, fields: PersonneFields) -> Result<()> {
    let patch = personne_record(fields);
    require_patch(&patch)?;
    ensure_exists(&services.personnes, "personne", id).await?;
    services.personnes.update(id, patch).await?;
    println!("Updated personne {}", id);
    Ok(())
}

pub(crate) async fn rm_impl(services: &Services, id: &str) -> Result<()> {
    ensure_exists(&services.personnes, "personne", id).await?;
    services.personnes.delete(id).await?;
    println!("Deleted personne {}", id);
    Ok(())
}

#[cfg(test)]
#[path = "personne_tests.rs"]
mod tests;
