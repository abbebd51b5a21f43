// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Typed equality filters and single-field sort descriptors.
//!
//! Filters and sorts are validated against the table schema before a
//! backend sees them, so column names never reach SQL unchecked.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::record::Record;
use crate::schema::TableSchema;

/// AND-combined exact-equality conditions.
///
/// A `null` condition matches records where the field is absent or null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter(BTreeMap<String, Value>);

impl Filter {
    /// An empty filter (matches everything).
    pub fn new() -> Self {
        Filter::default()
    }

    /// Adds a `field = value` condition.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Adds a condition only when a value is present.
    pub fn eq_opt(self, field: impl Into<String>, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(v) => self.eq(field, v),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates conditions in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Checks every field against the schema and normalizes the values.
    pub fn resolve(&self, schema: &TableSchema) -> Result<Filter> {
        let mut out = BTreeMap::new();
        for (field, value) in &self.0 {
            schema.check_column(field)?;
            out.insert(field.clone(), schema.normalize(field, value.clone()));
        }
        Ok(Filter(out))
    }

    /// Returns true if the record satisfies every condition.
    pub fn matches(&self, record: &Record) -> bool {
        self.0.iter().all(|(field, expected)| {
            let actual = record.get(field).unwrap_or(&Value::Null);
            match (expected, actual) {
                (Value::Null, actual) => actual.is_null(),
                (expected, actual) => values_equal(expected, actual),
            }
        })
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => a == b,
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// Single-field ordering, e.g. `ORDER BY nom ASC`.
///
/// Applied as a stable sort: ties keep store order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub direction: Direction,
}

impl Sort {
    pub fn asc(field: impl Into<String>) -> Self {
        Sort {
            field: field.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Sort {
            field: field.into(),
            direction: Direction::Desc,
        }
    }

    /// Rejects a sort on an undeclared column.
    pub fn validate(&self, schema: &TableSchema) -> Result<()> {
        schema.check_column(&self.field)
    }

    /// Compares two records on the sort field.
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let null = Value::Null;
        let ord = compare_values(
            a.get(&self.field).unwrap_or(&null),
            b.get(&self.field).unwrap_or(&null),
        );
        match self.direction {
            Direction::Asc => ord,
            Direction::Desc => ord.reverse(),
        }
    }

    /// Stable in-place sort of `rows`.
    pub fn apply(&self, rows: &mut [Record]) {
        rows.sort_by(|a, b| self.compare(a, b));
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ORDER BY {} {}", self.field, self.direction.as_sql())
    }
}

impl FromStr for Sort {
    type Err = Error;

    /// Parses `ORDER BY <field> <ASC|DESC>` (keywords case-insensitive).
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidOrder(s.to_string());
        let words: Vec<&str> = s.split_whitespace().collect();
        let [order, by, field, direction] = words.as_slice() else {
            return Err(invalid());
        };
        if !order.eq_ignore_ascii_case("order") || !by.eq_ignore_ascii_case("by") {
            return Err(invalid());
        }
        if field.is_empty()
            || !field
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(invalid());
        }
        let direction = if direction.eq_ignore_ascii_case("asc") {
            Direction::Asc
        } else if direction.eq_ignore_ascii_case("desc") {
            Direction::Desc
        } else {
            return Err(invalid());
        };
        Ok(Sort {
            field: (*field).to_string(),
            direction,
        })
    }
}

/// Orders values the way SQLite does: NULL, then numbers, then text.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) | Value::Number(_) => 1,
            Value::String(_) => 2,
            Value::Array(_) | Value::Object(_) => 3,
        }
    }
    fn number(v: &Value) -> f64 {
        match v {
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => n.as_f64().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    match rank(a).cmp(&rank(b)) {
        Ordering::Equal => match (a, b) {
            (Value::String(x), Value::String(y)) => x.as_bytes().cmp(y.as_bytes()),
            (Value::Null, Value::Null) => Ordering::Equal,
            (x, y) if rank(x) == 1 => number(x).partial_cmp(&number(y)).unwrap_or(Ordering::Equal),
            (x, y) => x.to_string().cmp(&y.to_string()),
        },
        other => other,
    }
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
