// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::{Path, PathBuf};

use eq_core::{Backend, StoreHandle};

use crate::config::{init_work_dir, Config, RemoteConfig};
use crate::error::Result;

pub async fn run(
    path: Option<String>,
    backend: Backend,
    remote: Option<String>,
    store: Option<String>,
) -> Result<()> {
    let target_path = match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir()?,
    };

    let (work_dir, config) = init_impl(&target_path, backend, remote, store).await?;

    println!("Initialized survey store at {}", work_dir.display());
    println!("Backend: {}", config.backend);
    match config.remote_url() {
        Some(url) => println!("Remote: {}", url),
        None => println!("Remote: none (changes stay queued locally)"),
    }
    Ok(())
}

/// Writes the config and creates the local tables.
pub(crate) async fn init_impl(
    target: &Path,
    backend: Backend,
    remote: Option<String>,
    store: Option<String>,
) -> Result<(PathBuf, Config)> {
    let mut config = Config::new(backend, remote.map(RemoteConfig::new))?;
    config.store = store;
    let work_dir = init_work_dir(target, &config)?;

    let handle = StoreHandle::new();
    handle
        .initialize(eq_core::store::open(
            config.backend,
            &config.store_path(&work_dir),
        )?)
        .await?;

    Ok((work_dir, config))
}

#[cfg(test)]
#[path = "init_tests.rs"]
mod tests;
