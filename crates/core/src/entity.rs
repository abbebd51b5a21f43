// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Survey entities and their per-table rules.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::query::Sort;
use crate::record::{is_blank, Record};
use crate::schema::Table;

/// Local sync marker: 0 = not confirmed by the remote, 1 = confirmed.
pub const SYNCED: &str = "synced";

/// A record type managed by an entity service.
pub trait Entity:
    Serialize + DeserializeOwned + Clone + std::fmt::Debug + Send + Sync + 'static
{
    const TABLE: Table;

    /// Required field groups, each with the message raised when any field
    /// of the group is missing or blank.
    const REQUIRED: &'static [(&'static [&'static str], &'static str)];

    /// Fields kept locally but never sent to the remote.
    const LOCAL_ONLY: &'static [&'static str] = &[];

    /// Order used for every list read, remote or local.
    fn default_order() -> Sort;

    fn id(&self) -> &str;

    /// Checks a full record before it is created.
    fn validate(record: &Record) -> Result<()> {
        for (fields, message) in Self::REQUIRED {
            if fields.iter().any(|f| is_blank(record, f)) {
                return Err(Error::Validation((*message).to_string()));
            }
        }
        Ok(())
    }

    /// Checks a partial update: a patch may omit required fields but may
    /// not blank them.
    fn validate_patch(patch: &Record) -> Result<()> {
        for (fields, message) in Self::REQUIRED {
            if fields
                .iter()
                .any(|f| patch.contains_key(*f) && is_blank(patch, f))
            {
                return Err(Error::Validation((*message).to_string()));
            }
        }
        Ok(())
    }

    /// Fields stripped before anything is sent to the remote.
    fn remote_exclusions() -> Vec<&'static str> {
        let mut fields = vec![SYNCED];
        fields.extend_from_slice(Self::LOCAL_ONLY);
        fields
    }
}

/// Fields stripped from payloads pushed to the remote for `table`.
pub fn remote_exclusions(table: Table) -> Vec<&'static str> {
    match table {
        Table::Participants => Participant::remote_exclusions(),
        Table::Sessions => Session::remote_exclusions(),
        Table::Personnes => Personne::remote_exclusions(),
        Table::SessionParticipants => SessionParticipant::remote_exclusions(),
        Table::SyncQueue => vec![SYNCED],
    }
}

/// A survey participant (a family or household).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub nom: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synced: Option<i64>,
}

impl Entity for Participant {
    const TABLE: Table = Table::Participants;
    const REQUIRED: &'static [(&'static [&'static str], &'static str)] =
        &[(&["nom"], "Le nom est requis")];

    fn default_order() -> Sort {
        Sort::asc("nom")
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// A field session: where and when the survey took place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub localite_activite: String,
    #[serde(default)]
    pub date_debut: String,
    #[serde(default)]
    pub date_fin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synced: Option<i64>,
}

impl Entity for Session {
    const TABLE: Table = Table::Sessions;
    const REQUIRED: &'static [(&'static [&'static str], &'static str)] = &[(
        &["localite_activite", "date_debut", "date_fin"],
        "Veuillez remplir tous les champs",
    )];

    fn default_order() -> Sort {
        Sort::desc("date_debut")
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// A person recorded during a session, reported by a participant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Personne {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub nom: String,
    #[serde(default)]
    pub prenoms: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_naissance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub situation_matrimoniale: Option<String>,
    /// Another personne (spouse or partner).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partenaire_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sexe: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ville_village: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numero_telephone: Option<String>,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub participant_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synced: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_id: Option<String>,
}

impl Entity for Personne {
    const TABLE: Table = Table::Personnes;
    const REQUIRED: &'static [(&'static [&'static str], &'static str)] = &[
        (
            &["session_id", "participant_id"],
            "Une session et un participant sont requis",
        ),
        (
            &["nom", "prenoms"],
            "Veuillez remplir les champs obligatoires",
        ),
    ];
    const LOCAL_ONLY: &'static [&'static str] = &["local_id"];

    fn default_order() -> Sort {
        Sort::desc("created_at")
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// Attendance of a participant at a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionParticipant {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub participant_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synced: Option<i64>,
}

impl Entity for SessionParticipant {
    const TABLE: Table = Table::SessionParticipants;
    const REQUIRED: &'static [(&'static [&'static str], &'static str)] = &[(
        &["session_id", "participant_id"],
        "Une session et un participant sont requis",
    )];

    fn default_order() -> Sort {
        Sort::desc("created_at")
    }

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
#[path = "entity_tests.rs"]
mod tests;
