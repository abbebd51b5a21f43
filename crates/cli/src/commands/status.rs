// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::BTreeMap;

use eq_core::Table;
use serde::Serialize;

use super::{print_json, Context};
use crate::display::format_status;
use crate::error::Result;
use crate::services::Services;
use crate::sync::NetworkStatus;

#[derive(Debug, Serialize)]
struct StatusJson<'a> {
    remote: Option<&'a str>,
    #[serde(flatten)]
    network: &'a NetworkStatus,
    records: BTreeMap<&'static str, usize>,
}

pub async fn run(ctx: &Context) -> Result<()> {
    let app = ctx.open().await?;
    let (network, counts) = status_impl(&app.services).await?;
    if ctx.json {
        let records = counts
            .iter()
            .filter(|(table, _)| *table != Table::SyncQueue)
            .map(|(table, count)| (table.name(), *count))
            .collect();
        print_json(&StatusJson {
            remote: app.remote_url(),
            network: &network,
            records,
        })
    } else {
        println!("{}", format_status(&network, app.remote_url(), &counts));
        Ok(())
    }
}

/// Connectivity, pending count and per-table counts. Never syncs.
pub(crate) async fn status_impl(
    services: &Services,
) -> Result<(NetworkStatus, Vec<(Table, usize)>)> {
    let network = services.monitor().refresh().await?;
    let counts = services.counts().await?;
    Ok((network, counts))
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
