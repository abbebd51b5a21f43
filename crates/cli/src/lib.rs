// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! eqrs - offline-first field survey client library.
//!
//! This crate provides the functionality behind the `enq` CLI: entity
//! services that write through to a remote backend when reachable and fall
//! back to the local store plus a mutation queue when not, and the sync
//! engine that replays that queue on reconnection.
//!
//! # Main Components
//!
//! - [`Services`] - one entity service per table plus the sync engine
//! - [`sync`] - remote backend, WebSocket transport, queue replay and
//!   connectivity monitoring
//! - [`Config`] - project configuration (`.enquete/config.toml`)
//! - [`Error`] - error types for all operations
//!
//! # Usage
//!
//! ```rust,ignore
//! use eqrs::App;
//!
//! let app = App::open(None, false).await?;
//! let created = app.services.participants.create(record).await?;
//! let status = app.services.monitor().check().await?;
//! ```

mod app;
mod cli;
pub mod colors;
mod commands;
mod display;
pub mod help;

pub mod config;
pub mod error;
pub mod logging;
pub mod services;
pub mod sync;

pub use app::App;
pub use cli::{
    CacheCommand, Cli, Command, OutputFormat, ParticipantCommand, PersonneCommand,
    PersonneFields, SessionCommand, SessionFields,
};
pub use config::{find_work_dir, init_work_dir, Config, RemoteConfig};
pub use error::{Error, Result};
pub use services::{EntityService, Services};

use clap::CommandFactory;
use clap_complete::generate;

use commands::Context;

/// Execute a parsed command line. This is the main entry point for library
/// users and provides a testable way to run commands without process
/// execution.
pub async fn run(cli: Cli) -> Result<()> {
    let ctx = Context {
        directory: cli.directory,
        offline: cli.offline,
        json: cli.output == OutputFormat::Json,
    };
    match cli.command {
        Command::Participant(cmd) => commands::participant::run(&ctx, cmd).await,
        Command::Session(cmd) => commands::session::run(&ctx, cmd).await,
        Command::Personne(cmd) => commands::personne::run(&ctx, cmd).await,
        Command::Init {
            path,
            backend,
            remote,
            store,
        } => {
            let path = path.or(ctx.directory);
            commands::init::run(path, backend, remote, store).await
        }
        Command::Status => commands::status::run(&ctx).await,
        Command::Sync { watch } => commands::sync::run(&ctx, watch).await,
        Command::Cache(cmd) => commands::cache::run(&ctx, cmd).await,
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "enq", &mut std::io::stdout());
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
