// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    validation = { Error::Validation("Une session et un participant sont requis".into()), "session" },
    invalid_order = { Error::InvalidOrder("ORDER nom".into()), "ORDER BY <field>" },
    invalid_action = { Error::InvalidAction("upsert".into()), "upsert" },
    missing_key = { Error::MissingKey { table: "participants".into() }, "participants" },
)]
fn error_display_contains(err: Error, expected: &str) {
    assert!(err.to_string().contains(expected));
}

#[test]
fn validation_message_is_passed_through_verbatim() {
    let err = Error::Validation("Une session et un participant sont requis".into());
    assert_eq!(err.to_string(), "Une session et un participant sont requis");
    assert!(err.is_validation());
}

#[test]
fn unknown_column_names_table_and_column() {
    let err = Error::UnknownColumn {
        table: "sessions".into(),
        column: "nom; DROP TABLE".into(),
    };
    let msg = err.to_string();
    assert!(msg.contains("sessions"));
    assert!(msg.contains("nom; DROP TABLE"));
    assert!(!err.is_validation());
}

#[test]
fn error_from_io() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn error_from_json() {
    let json_err = serde_json::from_str::<()>("invalid").unwrap_err();
    let err: Error = json_err.into();
    assert!(matches!(err, Error::Json(_)));
}
