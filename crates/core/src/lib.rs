// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! eq-core: storage and data model for the enquete field-survey client.
//!
//! This crate provides the table schema, the typed filter and sort
//! descriptors, the [`LocalStore`] abstraction with its SQLite and
//! document backends, the mutation queue, and the wire protocol spoken
//! with the remote backend.

pub mod entity;
pub mod error;
pub mod jsonl;
pub mod protocol;
pub mod query;
pub mod queue;
pub mod record;
pub mod schema;
pub mod store;

pub use entity::{Entity, Participant, Personne, Session, SessionParticipant, SYNCED};
pub use error::{Error, Result};
pub use query::{Direction, Filter, Sort};
pub use queue::{Action, SyncQueue, SyncQueueEntry};
pub use record::{Key, Record};
pub use schema::Table;
pub use store::{Backend, DocumentStore, LocalStore, SqliteStore, StoreHandle, StoreState};
