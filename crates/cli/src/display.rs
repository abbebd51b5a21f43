// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use eq_core::{Participant, Personne, Session, Table};

use crate::sync::{NetworkStatus, SyncReport};

/// Suffix for records the remote has not confirmed yet.
const UNSYNCED_MARKER: &str = " [unsynced]";

fn marker(synced: Option<i64>) -> &'static str {
    if synced == Some(0) {
        UNSYNCED_MARKER
    } else {
        ""
    }
}

/// Format a single participant line for list output
pub fn format_participant_line(p: &Participant) -> String {
    format!("- {}: {}{}", p.id, p.nom, marker(p.synced))
}

/// Format a single session line: `- id: localite (debut..fin)`
pub fn format_session_line(s: &Session) -> String {
    format!(
        "- {}: {} ({}..{}){}",
        s.id,
        s.localite_activite,
        s.date_debut,
        s.date_fin,
        marker(s.synced)
    )
}

/// Format a single personne line for list output
pub fn format_personne_line(p: &Personne) -> String {
    let mut line = format!("- {}: {} {}", p.id, p.nom, p.prenoms);
    if let Some(sexe) = p.sexe.as_deref().filter(|s| !s.is_empty()) {
        line.push_str(&format!(" ({})", sexe));
    }
    line.push_str(&format!(
        " [session {}, participant {}]",
        p.session_id, p.participant_id
    ));
    line.push_str(marker(p.synced));
    line
}

/// Format the status block: connectivity, queue and per-table counts.
///
/// Output format:
/// ```text
/// Remote: ws://host:7890 (online)
/// Pending changes: 2
/// Last sync: 2024-01-01T00:00:00Z
///
/// Records:
///   participants: 3
/// ```
pub fn format_status(
    status: &NetworkStatus,
    remote: Option<&str>,
    counts: &[(Table, usize)],
) -> String {
    let mut output = Vec::new();

    let state = if status.is_online { "online" } else { "offline" };
    match remote {
        Some(url) => output.push(format!("Remote: {} ({})", url, state)),
        None => output.push("Remote: none (local only)".to_string()),
    }
    output.push(format!("Pending changes: {}", status.pending));
    output.push(format!(
        "Last sync: {}",
        status.last_sync.as_deref().unwrap_or("never")
    ));

    let records: Vec<_> = counts
        .iter()
        .filter(|(table, _)| *table != Table::SyncQueue)
        .collect();
    if !records.is_empty() {
        output.push(String::new());
        output.push("Records:".to_string());
        for (table, count) in records {
            output.push(format!("  {}: {}", table, count));
        }
    }

    output.join("\n")
}

/// One-line summary of a sync run.
pub fn format_sync_report(report: &SyncReport) -> String {
    let mut line = format!("Pushed {} of {} change(s)", report.pushed, report.attempted);
    if report.failed > 0 {
        line.push_str(&format!(", {} failed", report.failed));
    }
    if report.deferred > 0 {
        line.push_str(&format!(", {} deferred", report.deferred));
    }
    line.push_str(&format!("; {} pending", report.remaining));
    line
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
