// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Project configuration management.
//!
//! Configuration is stored in `.enquete/config.toml` and includes:
//! - `backend`: local store strategy, `sqlite` (default) or `document`
//! - `store`: optional path for the local store
//! - `[remote]`: optional remote backend; absent means the device never
//!   leaves the offline path

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use eq_core::Backend;

use crate::error::{Error, Result};

pub const WORK_DIR_NAME: &str = ".enquete";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "enquete.db";
const DOCUMENT_DIR_NAME: &str = "store";

/// Project configuration stored in `.enquete/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: Backend,
    /// Optional path for the local store (relative to project root or absolute).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteConfig>,
}

/// Remote backend configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// WebSocket URL, `ws://...` or `wss://...`.
    pub url: String,
    /// Bound on each remote call (default: 5000).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Seconds between reachability probes while watching (default: 15).
    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,
    /// Bound on one reachability probe (default: 1500).
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

fn default_request_timeout_ms() -> u64 {
    5_000
}

fn default_probe_interval_secs() -> u64 {
    15
}

fn default_probe_timeout_ms() -> u64 {
    1_500
}

impl RemoteConfig {
    pub fn new(url: impl Into<String>) -> Self {
        RemoteConfig {
            url: url.into(),
            request_timeout_ms: default_request_timeout_ms(),
            probe_interval_secs: default_probe_interval_secs(),
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }

    /// Returns an error message if the URL is not a WebSocket URL.
    pub fn validate_url(&self) -> Option<String> {
        let url = &self.url;
        let rest = url
            .strip_prefix("ws://")
            .or_else(|| url.strip_prefix("wss://"));
        match rest {
            Some(host) if !host.is_empty() && !host.starts_with('/') => None,
            Some(_) => Some(format!("invalid remote URL '{url}': missing host")),
            None => Some(format!(
                "invalid remote URL '{url}': must start with ws:// or wss://"
            )),
        }
    }
}

impl Config {
    pub fn new(backend: Backend, remote: Option<RemoteConfig>) -> Result<Self> {
        let config = Config {
            backend,
            store: None,
            remote,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(message) = self.remote.as_ref().and_then(RemoteConfig::validate_url) {
            return Err(Error::Config(message));
        }
        Ok(())
    }

    /// Loads configuration from the given `.enquete/` directory.
    pub fn load(work_dir: &Path) -> Result<Self> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        let content = fs::read_to_string(&config_path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the given `.enquete/` directory.
    pub fn save(&self, work_dir: &Path) -> Result<()> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn remote_url(&self) -> Option<&str> {
        self.remote.as_ref().map(|r| r.url.as_str())
    }

    /// Location of the local store: a database file for SQLite, a
    /// directory for the document backend.
    pub fn store_path(&self, work_dir: &Path) -> PathBuf {
        match &self.store {
            Some(store) => {
                let path = Path::new(store);
                if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    // Relative to the project root
                    work_dir.parent().unwrap_or(work_dir).join(path)
                }
            }
            None => match self.backend {
                Backend::Sqlite => work_dir.join(DB_FILE_NAME),
                Backend::Document => work_dir.join(DOCUMENT_DIR_NAME),
            },
        }
    }
}

/// Find the .enquete directory by walking up from `start`.
pub fn find_work_dir(start: &Path) -> Result<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let work_dir = current.join(WORK_DIR_NAME);
        if work_dir.is_dir() {
            return Ok(work_dir);
        }
        if !current.pop() {
            return Err(Error::NotInitialized);
        }
    }
}

/// Initialize a new .enquete directory at the given path.
pub fn init_work_dir(path: &Path, config: &Config) -> Result<PathBuf> {
    let work_dir = path.join(WORK_DIR_NAME);

    if work_dir.join(CONFIG_FILE_NAME).exists() {
        return Err(Error::AlreadyInitialized(work_dir.display().to_string()));
    }

    config.validate()?;
    fs::create_dir_all(&work_dir)?;
    config.save(&work_dir)?;

    Ok(work_dir)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
