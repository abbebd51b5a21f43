// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Test doubles for the remote side: a scripted transport and an
//! in-memory remote backend with failure injection.

#![allow(clippy::unwrap_used)]

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use eq_core::protocol::{ClientMessage, ServerMessage};
use eq_core::{Filter, Record, Sort, Table};

use super::remote::{RemoteBackend, RemoteError, RemoteFuture};
use super::transport::{Transport, TransportError, TransportFuture};

/// Timestamp the in-memory remote stamps on inserted records.
pub const REMOTE_STAMP: &str = "2024-01-01T00:00:00Z";

type Responder = dyn Fn(&ClientMessage) -> Option<ServerMessage> + Send + Sync;

/// Transport that answers each sent request through a responder closure.
///
/// Without a responder, `recv` never resolves, which lets tests exercise
/// request timeouts.
#[derive(Clone, Default)]
pub struct MockTransport {
    connected: Arc<AtomicBool>,
    fail_connect: Arc<AtomicBool>,
    connects: Arc<Mutex<usize>>,
    sent: Arc<Mutex<Vec<ClientMessage>>>,
    incoming: Arc<Mutex<VecDeque<String>>>,
    responder: Option<Arc<Responder>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn responding(
        responder: impl Fn(&ClientMessage) -> Option<ServerMessage> + Send + Sync + 'static,
    ) -> Self {
        MockTransport {
            responder: Some(Arc::new(responder)),
            ..Self::default()
        }
    }

    /// Queue a raw frame ahead of any responder output.
    pub fn push_frame(&self, frame: impl Into<String>) {
        self.incoming.lock().unwrap().push_back(frame.into());
    }

    pub fn set_connect_fail(&self, fail: bool) {
        self.fail_connect.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<ClientMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn connects(&self) -> usize {
        *self.connects.lock().unwrap()
    }

    pub fn connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

impl Transport for MockTransport {
    fn connect(&mut self, _url: &str) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            if self.fail_connect.load(Ordering::SeqCst) {
                return Err(TransportError::ConnectionFailed("mock failure".into()));
            }
            *self.connects.lock().unwrap() += 1;
            self.connected.store(true, Ordering::SeqCst);
            Ok(())
        })
    }

    fn disconnect(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            self.connected.store(false, Ordering::SeqCst);
            Ok(())
        })
    }

    fn send(&mut self, frame: String) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            if !self.connected() {
                return Err(TransportError::ConnectionClosed);
            }
            let msg = ClientMessage::from_json(&frame).unwrap();
            if let Some(reply) = self.responder.as_ref().and_then(|r| r(&msg)) {
                self.push_frame(reply.to_json().unwrap());
            }
            self.sent.lock().unwrap().push(msg);
            Ok(())
        })
    }

    fn recv(&mut self) -> TransportFuture<'_, Option<String>> {
        Box::pin(async move {
            let next = self.incoming.lock().unwrap().pop_front();
            match next {
                Some(frame) => Ok(Some(frame)),
                None => std::future::pending().await,
            }
        })
    }

    fn is_connected(&self) -> bool {
        self.connected()
    }
}

/// In-memory remote backend.
///
/// Mirrors the reference server: inserts conflict on an existing id and
/// stamp timestamps, updates and deletes of unknown ids succeed.
#[derive(Default)]
pub struct MemoryRemote {
    tables: Mutex<BTreeMap<Table, Vec<Record>>>,
    offline: AtomicBool,
    failing_ids: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
}

impl MemoryRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every call fail as unavailable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Make calls touching this record id fail as unavailable.
    pub fn fail_id(&self, id: &str) {
        self.failing_ids.lock().unwrap().insert(id.to_string());
    }

    /// Make only `action` calls on this record id fail.
    pub fn fail_call(&self, action: &str, id: &str) {
        self.failing_ids
            .lock()
            .unwrap()
            .insert(format!("{action} {id}"));
    }

    pub fn heal(&self) {
        self.failing_ids.lock().unwrap().clear();
    }

    pub fn seed(&self, table: Table, record: Record) {
        self.tables
            .lock()
            .unwrap()
            .entry(table)
            .or_default()
            .push(record);
    }

    pub fn rows(&self, table: Table) -> Vec<Record> {
        self.tables
            .lock()
            .unwrap()
            .get(&table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn get(&self, table: Table, id: &str) -> Option<Record> {
        self.rows(table).into_iter().find(|r| record_id(r) == id)
    }

    /// Calls received so far, as `"<action> <table> <id>"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn check(&self, action: &str, table: Table, id: &str) -> Result<(), RemoteError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{action} {} {id}", table.name()));
        let failing = self.failing_ids.lock().unwrap();
        if self.offline.load(Ordering::SeqCst)
            || failing.contains(id)
            || failing.contains(&format!("{action} {id}"))
        {
            return Err(RemoteError::Unavailable("injected failure".into()));
        }
        Ok(())
    }
}

fn record_id(record: &Record) -> String {
    record
        .get("id")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

impl RemoteBackend for MemoryRemote {
    fn insert(&self, table: Table, mut record: Record) -> RemoteFuture<'_, Record> {
        Box::pin(async move {
            let id = record_id(&record);
            self.check("insert", table, &id)?;
            if self.get(table, &id).is_some() {
                return Err(RemoteError::Conflict(format!("duplicate id {id}")));
            }
            for field in ["created_at", "updated_at"] {
                if table.schema().has_column(field) && !record.contains_key(field) {
                    record.insert(field.into(), REMOTE_STAMP.into());
                }
            }
            self.seed(table, record.clone());
            Ok(record)
        })
    }

    fn update(&self, table: Table, id: String, patch: Record) -> RemoteFuture<'_, ()> {
        Box::pin(async move {
            self.check("update", table, &id)?;
            let mut tables = self.tables.lock().unwrap();
            if let Some(row) = tables
                .entry(table)
                .or_default()
                .iter_mut()
                .find(|r| record_id(r) == id)
            {
                row.extend(patch);
            }
            Ok(())
        })
    }

    fn delete(&self, table: Table, id: String) -> RemoteFuture<'_, ()> {
        Box::pin(async move {
            self.check("delete", table, &id)?;
            self.tables
                .lock()
                .unwrap()
                .entry(table)
                .or_default()
                .retain(|r| record_id(r) != id);
            Ok(())
        })
    }

    fn select(
        &self,
        table: Table,
        filter: Filter,
        order: Option<Sort>,
    ) -> RemoteFuture<'_, Vec<Record>> {
        Box::pin(async move {
            self.check("select", table, "*")?;
            let mut rows: Vec<Record> = self
                .rows(table)
                .into_iter()
                .filter(|r| filter.matches(r))
                .collect();
            if let Some(order) = order {
                order.apply(&mut rows);
            }
            Ok(rows)
        })
    }
}
