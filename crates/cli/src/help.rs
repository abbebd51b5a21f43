// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Help text generation with colorization support.

use crate::colors;
use clap::builder::styling::Styles;

/// Generate clap Styles for help output.
pub fn styles() -> Styles {
    if !colors::should_colorize() {
        return Styles::plain();
    }

    use anstyle::{Ansi256Color, Color, Style};

    let color = |code| Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(code))));
    let header = color(colors::codes::HEADER);
    let context = color(colors::codes::CONTEXT);

    Styles::styled()
        .header(header)
        .usage(header)
        .literal(color(colors::codes::LITERAL))
        .placeholder(context)
        .valid(context)
}

/// Main help template with colorized Options header.
pub fn template() -> String {
    format!(
        "{{about-with-newline}}
{{usage-heading}} {{usage}}

{{before-help}}{}
{{options}}{{after-help}}",
        colors::header("Options:")
    )
}

/// Commands list shown before options in main help.
pub fn commands() -> String {
    format!(
        "\
{header_records}
  {participant}  Add, list, edit or delete participants
  {session}      Add, list, edit or delete sessions
  {personne}     Add, list, edit or delete personnes

{header_sync}
  {status}       Show connectivity and pending changes
  {sync}         Push pending changes to the remote

{header_setup}
  {init}         Initialize the local store
  {cache}        Clear the local cache
  {completion}   Generate shell completions",
        header_records = colors::header("Records:"),
        header_sync = colors::header("Synchronization:"),
        header_setup = colors::header("Setup:"),
        participant = colors::literal("participant"),
        session = colors::literal("session"),
        personne = colors::literal("personne"),
        status = colors::literal("status"),
        sync = colors::literal("sync"),
        init = colors::literal("init"),
        cache = colors::literal("cache"),
        completion = colors::literal("completion"),
    )
}

/// Quickstart help shown after options in main help.
pub fn quickstart() -> String {
    colors::examples(
        "\
Get started:
  enq init --remote ws://host:7890    Initialize with a remote
  enq participant add \"Famille X\"     Record a participant
  enq session list                    List sessions
  enq status                          Show pending changes
  enq sync                            Push pending changes",
    )
}
