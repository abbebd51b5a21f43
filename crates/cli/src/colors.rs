// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal colors for help and status output.
//!
//! Respects environment variables:
//! - `NO_COLOR=1`: Disables colors
//! - `COLOR=1`: Forces colors even without TTY

use std::io::IsTerminal;

/// ANSI 256-color codes.
pub mod codes {
    /// Section headers
    pub const HEADER: u8 = 74;
    /// Commands and literals
    pub const LITERAL: u8 = 250;
    /// Placeholders and secondary text
    pub const CONTEXT: u8 = 245;
    /// Records not yet confirmed by the remote
    pub const PENDING: u8 = 179;
}

/// Check if colors should be enabled based on TTY and environment variables.
pub fn should_colorize() -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }
    std::io::stdout().is_terminal()
}

const RESET: &str = "\x1b[0m";

fn paint(code: u8, text: &str) -> String {
    if should_colorize() {
        format!("\x1b[38;5;{code}m{text}{RESET}")
    } else {
        text.to_string()
    }
}

pub fn header(text: &str) -> String {
    paint(codes::HEADER, text)
}

pub fn literal(text: &str) -> String {
    paint(codes::LITERAL, text)
}

pub fn context(text: &str) -> String {
    paint(codes::CONTEXT, text)
}

pub fn pending(text: &str) -> String {
    paint(codes::PENDING, text)
}

/// Colorize an examples help block.
///
/// Lines ending in `:` are headers; in `command  description` lines the
/// command is a literal, with `<placeholders>` dimmed.
pub fn examples(text: &str) -> String {
    if !should_colorize() {
        return text.to_string();
    }
    text.lines()
        .map(|line| {
            let trimmed = line.trim_start();
            let indent = &line[..line.len() - trimmed.len()];
            if trimmed.ends_with(':') && !trimmed.contains("  ") {
                return format!("{indent}{}", header(trimmed));
            }
            match description_start(trimmed) {
                Some(end) => format!(
                    "{indent}{}{}",
                    command(&trimmed[..end]),
                    &trimmed[end..]
                ),
                None if !indent.is_empty() => format!("{indent}{}", command(trimmed)),
                None => line.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Literal color for words, context color for `<placeholder>` words.
fn command(cmd: &str) -> String {
    cmd.split(' ')
        .map(|word| {
            if word.starts_with('<') && word.ends_with('>') {
                context(word)
            } else {
                literal(word)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Byte offset where the description begins (the first run of 2+ spaces).
pub fn description_start(line: &str) -> Option<usize> {
    line.find("  ")
}

#[cfg(test)]
#[path = "colors_tests.rs"]
mod tests;
