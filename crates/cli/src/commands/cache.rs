// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::{BufRead, IsTerminal, Write};

use super::Context;
use crate::cli::CacheCommand;
use crate::error::{Error, Result};
use crate::services::Services;

pub async fn run(ctx: &Context, cmd: CacheCommand) -> Result<()> {
    match cmd {
        CacheCommand::Clear { yes } => clear(ctx, yes).await,
    }
}

async fn clear(ctx: &Context, yes: bool) -> Result<()> {
    let app = ctx.open().await?;
    if !yes && !confirm()? {
        return Err(Error::ConfirmationRequired);
    }
    let discarded = clear_impl(&app.services).await?;
    println!(
        "Cleared local cache ({} pending change(s) discarded)",
        discarded
    );
    Ok(())
}

/// Empties every table. Returns how many queued changes were dropped.
pub(crate) async fn clear_impl(services: &Services) -> Result<usize> {
    let discarded = services.queue.len().await?;
    services.clear_cache().await?;
    Ok(discarded)
}

/// Asks on the terminal. Without one the answer is no.
fn confirm() -> Result<bool> {
    let stdin = std::io::stdin();
    if !stdin.is_terminal() {
        return Ok(false);
    }
    eprint!("Delete every cached record and pending change? [y/N] ");
    std::io::stderr().flush()?;
    let mut answer = String::new();
    stdin.lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
