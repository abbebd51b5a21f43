// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! JSON Lines files backing the document store.
//!
//! A table file is rewritten whole on every mutation: the new content goes
//! to a sibling temp file which is fsynced and renamed over the original.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Error, Result};

/// Reads all lines of a JSONL file.
///
/// Returns an empty vec if the file doesn't exist. A malformed last line
/// (an interrupted write) is skipped with a warning; a malformed line
/// anywhere else is an error.
pub fn read_all<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let reader = BufReader::new(File::open(path)?);
    let lines: Vec<String> = reader.lines().collect::<std::io::Result<_>>()?;
    let last = lines.iter().rposition(|l| !l.trim().is_empty());

    let mut records = Vec::with_capacity(lines.len());
    for (idx, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(line) {
            Ok(record) => records.push(record),
            Err(e) if Some(idx) == last => {
                tracing::warn!(path = %path.display(), error = %e, "skipping truncated trailing line");
            }
            Err(e) => {
                return Err(Error::CorruptedData(format!(
                    "{}:{}: {e}",
                    path.display(),
                    idx + 1
                )))
            }
        }
    }

    Ok(records)
}

/// Replaces the content of a JSONL file.
pub fn write_all<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let tmp = temp_path(path);
    {
        let mut file = File::create(&tmp)?;
        for record in records {
            let json = serde_json::to_string(record)?;
            writeln!(file, "{json}")?;
        }
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
#[path = "jsonl_tests.rs"]
mod tests;
