// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! eq-remote: reference remote backend for enquete clients.
//!
//! Serves the survey tables over WebSocket, one request/response exchange
//! per table operation, backed by a SQLite store in the data directory.

mod server;
mod state;

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// eq-remote: field survey remote backend
#[derive(Parser, Debug)]
#[command(name = "eq-remote")]
#[command(about = "WebSocket remote backend for enquete survey clients")]
struct Args {
    /// Address to bind the server to
    #[arg(short, long, default_value = "0.0.0.0:7890")]
    bind: SocketAddr,

    /// Directory for the database
    #[arg(short, long, default_value = ".")]
    data: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting eq-remote server");
    info!("  Bind address: {}", args.bind);
    info!("  Data directory: {}", args.data.display());

    let state = state::ServerState::open(&args.data).await?;

    server::run(args.bind, state).await?;

    Ok(())
}
