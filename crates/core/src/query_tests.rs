// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::schema::Table;
use serde_json::json;
use yare::parameterized;

fn rec(value: Value) -> Record {
    value.as_object().unwrap().clone()
}

#[parameterized(
    asc = { "ORDER BY nom ASC", "nom", Direction::Asc },
    desc = { "ORDER BY created_at DESC", "created_at", Direction::Desc },
    lowercase = { "order by date_debut desc", "date_debut", Direction::Desc },
    extra_spaces = { "  ORDER   BY  nom   ASC ", "nom", Direction::Asc },
)]
fn sort_parses(input: &str, field: &str, direction: Direction) {
    let sort: Sort = input.parse().unwrap();
    assert_eq!(sort.field, field);
    assert_eq!(sort.direction, direction);
}

#[parameterized(
    empty = { "" },
    missing_direction = { "ORDER BY nom" },
    bad_direction = { "ORDER BY nom UP" },
    two_fields = { "ORDER BY nom, prenoms ASC" },
    injection = { "ORDER BY nom;DROP ASC" },
    missing_by = { "ORDER nom ASC" },
)]
fn sort_rejects(input: &str) {
    assert!(matches!(input.parse::<Sort>(), Err(Error::InvalidOrder(_))));
}

#[test]
fn sort_display_roundtrips_grammar() {
    let sort = Sort::desc("date_debut");
    assert_eq!(sort.to_string(), "ORDER BY date_debut DESC");
    assert_eq!(sort.to_string().parse::<Sort>().unwrap(), sort);
}

#[test]
fn sort_validate_checks_schema() {
    let schema = Table::Participants.schema();
    assert!(Sort::asc("nom").validate(schema).is_ok());
    assert!(Sort::asc("date_debut").validate(schema).is_err());
}

#[test]
fn sort_is_stable_for_ties() {
    let mut rows = vec![
        rec(json!({"id": "a", "k": 1})),
        rec(json!({"id": "b", "k": 0})),
        rec(json!({"id": "c", "k": 1})),
        rec(json!({"id": "d", "k": 0})),
    ];
    Sort::desc("k").apply(&mut rows);
    let ids: Vec<&str> = rows.iter().map(|r| r["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["a", "c", "b", "d"]);
}

#[parameterized(
    null_before_number = { Value::Null, json!(0), Ordering::Less },
    number_before_text = { json!(99), json!("1"), Ordering::Less },
    numeric = { json!(2), json!(10), Ordering::Less },
    bytewise_text = { json!("Z"), json!("a"), Ordering::Less },
    equal_text = { json!("x"), json!("x"), Ordering::Equal },
)]
fn compare_like_sqlite(a: Value, b: Value, expected: Ordering) {
    assert_eq!(compare_values(&a, &b), expected);
}

#[test]
fn filter_matches_all_conditions() {
    let filter = Filter::new().eq("session_id", "s1").eq("participant_id", "p1");
    assert!(filter.matches(&rec(json!({"session_id": "s1", "participant_id": "p1"}))));
    assert!(!filter.matches(&rec(json!({"session_id": "s1", "participant_id": "p2"}))));
    assert!(Filter::new().matches(&Record::new()));
}

#[test]
fn filter_null_matches_absent_or_null() {
    let filter = Filter::new().eq("partenaire_id", Value::Null);
    assert!(filter.matches(&rec(json!({"partenaire_id": null}))));
    assert!(filter.matches(&rec(json!({}))));
    assert!(!filter.matches(&rec(json!({"partenaire_id": "x"}))));
}

#[test]
fn filter_resolve_normalizes_and_validates() {
    let schema = Table::Participants.schema();
    let resolved = Filter::new().eq("synced", true).resolve(schema).unwrap();
    assert!(resolved.matches(&rec(json!({"synced": 1}))));

    let err = Filter::new().eq("nope", 1).resolve(schema).unwrap_err();
    assert!(matches!(err, Error::UnknownColumn { .. }));
}

#[test]
fn filter_eq_opt_skips_none() {
    let filter = Filter::new()
        .eq_opt("session_id", Some("s1"))
        .eq_opt("participant_id", None::<&str>);
    assert_eq!(filter.len(), 1);
}
