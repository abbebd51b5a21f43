// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::colors;
use crate::help;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use eq_core::Backend;

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "enq")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline-first field survey recorder")]
#[command(
    long_about = "Offline-first field survey recorder.\n\n\
    Records participants, sessions and personnes locally and pushes queued changes \
    to the remote backend whenever it is reachable."
)]
#[command(help_template = help::template())]
#[command(before_help = help::commands())]
#[command(after_help = help::quickstart())]
#[command(styles = help::styles())]
pub struct Cli {
    /// Run as if enq was started in <path>
    #[arg(short = 'C', long = "directory", global = true, value_name = "path")]
    pub directory: Option<String>,

    /// Never contact the remote; every write is queued
    #[arg(long, global = true)]
    pub offline: bool,

    /// Log debug output to stderr (ENQ_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json)
    #[arg(long = "output", short = 'o', value_enum, default_value = "text", global = true)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Manage participants (families, households)
    #[command(subcommand)]
    Participant(ParticipantCommand),

    /// Manage field sessions
    #[command(subcommand)]
    Session(SessionCommand),

    /// Manage personnes recorded during sessions
    #[command(subcommand)]
    Personne(PersonneCommand),

    /// Initialize the local store in the current directory
    #[command(after_help = colors::examples("\
Examples:
  enq init                                  Local only, SQLite store
  enq init --remote ws://10.0.0.2:7890      With a remote backend
  enq init --backend document               JSONL document store"))]
    Init {
        /// Directory to initialize (default: current directory)
        path: Option<String>,

        /// Local store backend (sqlite, document)
        #[arg(long, default_value = "sqlite")]
        backend: Backend,

        /// Remote backend URL (ws:// or wss://)
        #[arg(long, value_name = "URL")]
        remote: Option<String>,

        /// Store location (relative to the project root or absolute)
        #[arg(long, value_name = "PATH")]
        store: Option<String>,
    },

    /// Show connectivity, pending changes and record counts
    Status,

    /// Push pending changes to the remote now
    #[command(after_help = colors::examples("\
Examples:
  enq sync            Push queued changes once
  enq sync --watch    Keep syncing on reconnection until Ctrl-C"))]
    Sync {
        /// Keep watching connectivity and sync on reconnection
        #[arg(long)]
        watch: bool,
    },

    /// Manage the local cache
    #[command(subcommand)]
    Cache(CacheCommand),

    /// Generate shell completions
    #[command(arg_required_else_help = true)]
    Completion {
        /// Target shell
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum CacheCommand {
    /// Delete every cached record and every pending change
    Clear {
        /// Do not ask for confirmation
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ParticipantCommand {
    /// Record a participant
    Add {
        #[arg(value_parser = non_empty_string)]
        nom: String,
    },
    /// List participants by name
    List,
    /// Rename a participant
    Edit {
        id: String,
        #[arg(long)]
        nom: Option<String>,
    },
    /// Delete a participant
    Rm { id: String },
}

/// Session fields; all optional so `edit` can patch any subset.
#[derive(Args, Debug, Default)]
pub struct SessionFields {
    /// Locality where the activity took place
    #[arg(long = "localite")]
    pub localite_activite: Option<String>,
    /// Start date (YYYY-MM-DD)
    #[arg(long = "debut")]
    pub date_debut: Option<String>,
    /// End date (YYYY-MM-DD)
    #[arg(long = "fin")]
    pub date_fin: Option<String>,
}

#[derive(Subcommand)]
pub enum SessionCommand {
    /// Record a session
    #[command(after_help = colors::examples("\
Examples:
  enq session add --localite Abobo --debut 2024-01-01 --fin 2024-01-02"))]
    Add {
        #[command(flatten)]
        fields: SessionFields,
    },
    /// List sessions, most recent first
    List,
    /// Change session fields
    Edit {
        id: String,
        #[command(flatten)]
        fields: SessionFields,
    },
    /// Delete a session
    Rm { id: String },
}

/// Personne fields; all optional so `edit` can patch any subset.
#[derive(Args, Debug, Default)]
pub struct PersonneFields {
    /// Session the personne was recorded in
    #[arg(long = "session")]
    pub session_id: Option<String>,
    /// Participant who reported the personne
    #[arg(long = "participant")]
    pub participant_id: Option<String>,
    #[arg(long)]
    pub nom: Option<String>,
    #[arg(long)]
    pub prenoms: Option<String>,
    #[arg(long)]
    pub date_naissance: Option<String>,
    #[arg(long)]
    pub situation_matrimoniale: Option<String>,
    /// Spouse or partner (another personne id)
    #[arg(long = "partenaire")]
    pub partenaire_id: Option<String>,
    #[arg(long)]
    pub sexe: Option<String>,
    #[arg(long = "ville")]
    pub ville_village: Option<String>,
    #[arg(long)]
    pub occupation: Option<String>,
    #[arg(long = "telephone")]
    pub numero_telephone: Option<String>,
}

#[derive(Subcommand)]
pub enum PersonneCommand {
    /// Record a personne
    #[command(after_help = colors::examples("\
Examples:
  enq personne add --session <id> --participant <id> --nom Kouassi --prenoms Ama"))]
    Add {
        #[command(flatten)]
        fields: PersonneFields,
    },
    /// List personnes, most recent first
    List {
        /// Only personnes from this session
        #[arg(long)]
        session: Option<String>,
        /// Only personnes reported by this participant
        #[arg(long)]
        participant: Option<String>,
    },
    /// Change personne fields
    Edit {
        id: String,
        #[command(flatten)]
        fields: PersonneFields,
    },
    /// Delete a personne
    Rm { id: String },
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
