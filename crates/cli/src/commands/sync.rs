// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::{print_json, Context};
use crate::app::App;
use crate::display::format_sync_report;
use crate::error::{Error, Result};
use crate::services::Services;
use crate::sync::{SyncOutcome, SyncReport};

pub async fn run(ctx: &Context, watch: bool) -> Result<()> {
    let app = ctx.open().await?;
    if watch {
        return watch_impl(&app).await;
    }

    let result = sync_impl(&app.services).await;
    app.save_last_sync()?;
    let report = result?;
    if ctx.json {
        print_json(&report)
    } else {
        println!("{}", format_sync_report(&report));
        Ok(())
    }
}

/// One manual sync pass. Offline is an error so scripts can tell a
/// skipped sync from an empty one.
pub(crate) async fn sync_impl(services: &Services) -> Result<SyncReport> {
    match services.monitor().sync_now().await? {
        SyncOutcome::Completed(report) => Ok(report),
        SyncOutcome::AlreadyRunning => Err(Error::Remote("a sync is already running".into())),
        SyncOutcome::Offline => {
            let pending = services.queue.len().await?;
            Err(Error::Remote(format!(
                "remote unreachable, {} change(s) kept for later",
                pending
            )))
        }
    }
}

async fn watch_impl(app: &App) -> Result<()> {
    let monitor = app.services.monitor();
    let handle = monitor.start();
    eprintln!("Watching connectivity, press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    handle.stop().await;
    app.save_last_sync()?;

    let status = monitor.status();
    println!("{} change(s) pending", status.pending);
    Ok(())
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
