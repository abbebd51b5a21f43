// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Untyped records as they travel between stores, queue and remote.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::schema::PRIMARY_KEY;

/// A record: field name to JSON value.
pub type Record = serde_json::Map<String, Value>;

/// Primary key of a stored record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    /// Auto-incremented key (queue entries).
    Int(i64),
    /// Client-assigned key (entity UUIDs).
    Text(String),
}

impl Key {
    /// Reads a key out of a JSON value.
    pub fn from_value(value: &Value) -> Option<Key> {
        match value {
            Value::String(s) if !s.is_empty() => Some(Key::Text(s.clone())),
            Value::Number(n) => n.as_i64().map(Key::Int),
            _ => None,
        }
    }

    /// Reads the `id` field of a record.
    pub fn of(record: &Record) -> Option<Key> {
        record.get(PRIMARY_KEY).and_then(Key::from_value)
    }

    /// Converts the key into a JSON value.
    pub fn to_value(&self) -> Value {
        match self {
            Key::Int(n) => Value::from(*n),
            Key::Text(s) => Value::from(s.as_str()),
        }
    }

    /// Returns the integer key, if any.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Key::Int(n) => Some(*n),
            Key::Text(_) => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(n) => write!(f, "{n}"),
            Key::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Text(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Text(s)
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::Int(n)
    }
}

/// Generates a new client-side identifier (UUIDv4).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Serializes a value into a record. Fails unless it serializes to an object.
pub fn to_record<T: Serialize>(value: &T) -> Result<Record> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::CorruptedData(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

/// Deserializes a record into a typed value.
pub fn from_record<T: DeserializeOwned>(record: Record) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(record))?)
}

/// Returns a copy of `record` without the given fields.
pub fn without(record: &Record, fields: &[&str]) -> Record {
    record
        .iter()
        .filter(|(k, _)| !fields.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Returns true if the field is absent, null, or a blank string.
pub fn is_blank(record: &Record, field: &str) -> bool {
    match record.get(field) {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
