// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::panic)]

use super::*;
use yare::parameterized;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("enq").chain(args.iter().copied())).unwrap()
}

#[test]
fn personne_add_maps_flags_to_fields() {
    let cli = parse(&[
        "personne", "add", "--session", "s1", "--participant", "u1", "--nom", "Kouassi",
        "--prenoms", "Ama", "--ville", "Bouaké", "--telephone", "0102",
    ]);
    let Command::Personne(PersonneCommand::Add { fields }) = cli.command else {
        panic!("expected personne add");
    };
    assert_eq!(fields.session_id.as_deref(), Some("s1"));
    assert_eq!(fields.participant_id.as_deref(), Some("u1"));
    assert_eq!(fields.ville_village.as_deref(), Some("Bouaké"));
    assert_eq!(fields.numero_telephone.as_deref(), Some("0102"));
    assert_eq!(fields.occupation, None);
}

#[test]
fn global_flags_are_accepted_after_the_subcommand() {
    let cli = parse(&["session", "list", "--offline", "-o", "json", "-C", "/tmp/x"]);
    assert!(cli.offline);
    assert_eq!(cli.output, OutputFormat::Json);
    assert_eq!(cli.directory.as_deref(), Some("/tmp/x"));
}

#[parameterized(
    default = { &["init"], Backend::Sqlite },
    document = { &["init", "--backend", "document"], Backend::Document },
)]
fn init_backend(args: &[&str], expected: Backend) {
    let Command::Init { backend, .. } = parse(args).command else {
        panic!("expected init");
    };
    assert_eq!(backend, expected);
}

#[parameterized(
    unknown_backend = { &["init", "--backend", "indexeddb"] },
    blank_name = { &["participant", "add", "  "] },
    missing_id = { &["session", "rm"] },
)]
fn invalid_invocations_are_rejected(args: &[&str]) {
    assert!(Cli::try_parse_from(std::iter::once("enq").chain(args.iter().copied())).is_err());
}

#[test]
fn sync_watch_and_cache_clear_flags() {
    assert!(matches!(
        parse(&["sync", "--watch"]).command,
        Command::Sync { watch: true }
    ));
    assert!(matches!(
        parse(&["cache", "clear", "-y"]).command,
        Command::Cache(CacheCommand::Clear { yes: true })
    ));
}

#[test]
fn cli_definition_is_consistent() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
}
