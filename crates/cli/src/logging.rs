// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing setup for the `enq` binary.
//!
//! Logs go to stderr so stdout stays clean for command output. The filter
//! comes from `ENQ_LOG` when set, otherwise from the verbosity flag.

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "ENQ_LOG";

pub(crate) fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Installs the global subscriber. A second call is a no-op.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
