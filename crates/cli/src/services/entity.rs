// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Online/offline CRUD for one entity type.
//!
//! Each call checks connectivity first. Online calls go to the remote and
//! are mirrored into the local store with `synced = 1`; a remote failure
//! or an offline device falls back to the local store with `synced = 0`
//! plus a queue entry. Remote failures are logged, never returned.

use std::marker::PhantomData;
use std::sync::Arc;

use eq_core::record::{from_record, is_blank, new_id, without};
use eq_core::schema::PRIMARY_KEY;
use eq_core::{Action, Entity, Filter, Key, Record, StoreHandle, SyncQueue, SYNCED};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::sync::{Connectivity, RemoteBackend};

/// Message for update/delete calls without an id.
const MISSING_ID: &str = "Identifiant requis";

pub struct EntityService<E: Entity> {
    store: StoreHandle,
    queue: SyncQueue,
    remote: Arc<dyn RemoteBackend>,
    connectivity: Arc<dyn Connectivity>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for EntityService<E> {
    fn clone(&self) -> Self {
        EntityService {
            store: self.store.clone(),
            queue: self.queue.clone(),
            remote: Arc::clone(&self.remote),
            connectivity: Arc::clone(&self.connectivity),
            _entity: PhantomData,
        }
    }
}

fn with_synced(mut record: Record, synced: i64) -> Record {
    record.insert(SYNCED.into(), synced.into());
    record
}

impl<E: Entity> EntityService<E> {
    pub fn new(
        store: StoreHandle,
        queue: SyncQueue,
        remote: Arc<dyn RemoteBackend>,
        connectivity: Arc<dyn Connectivity>,
    ) -> Self {
        EntityService {
            store,
            queue,
            remote,
            connectivity,
            _entity: PhantomData,
        }
    }

    async fn is_online(&self) -> bool {
        self.connectivity.fetch_once().await
    }

    /// Whether a write for this id can go straight to the remote: online,
    /// with no earlier queued write for the same record still waiting.
    async fn can_write_through(&self, id: &str) -> Result<bool> {
        if !self.is_online().await {
            return Ok(false);
        }
        let pending = self.queue.pending_for(E::TABLE, id).await?;
        if pending > 0 {
            debug!(table = %E::TABLE, id, pending, "earlier writes still queued");
        }
        Ok(pending == 0)
    }

    /// Creates a record, assigning a UUIDv4 id when none is given.
    ///
    /// Returns the remote's copy when the remote accepted it, otherwise
    /// the locally stored copy.
    pub async fn create(&self, data: Record) -> Result<E> {
        E::validate(&data)?;

        let mut payload = without(&data, E::LOCAL_ONLY);
        payload.remove(SYNCED);
        if is_blank(&payload, PRIMARY_KEY) {
            payload.insert(PRIMARY_KEY.into(), Value::String(new_id()));
        }
        let id = payload
            .get(PRIMARY_KEY)
            .and_then(Key::from_value)
            .map(|k| k.to_string())
            .unwrap_or_default();

        if self.can_write_through(&id).await? {
            match self.remote.insert(E::TABLE, payload.clone()).await {
                Ok(remote) => {
                    self.store
                        .insert(E::TABLE, with_synced(remote.clone(), 1))
                        .await?;
                    debug!(table = %E::TABLE, id = %id, "created remotely");
                    return Ok(from_record(remote)?);
                }
                Err(e) => {
                    warn!(table = %E::TABLE, id = %id, error = %e, "remote create failed, queued")
                }
            }
        }

        let local = with_synced(payload.clone(), 0);
        self.store.insert(E::TABLE, local.clone()).await?;
        self.queue
            .append(E::TABLE, &id, Action::Create, &payload)
            .await?;
        debug!(table = %E::TABLE, id = %id, "created locally");
        Ok(from_record(local)?)
    }

    /// Reads every record matching `filter`, in the entity's fixed order.
    ///
    /// Online results are mirrored locally; cached records absent from the
    /// remote answer are left alone.
    pub async fn read_all(&self, filter: Filter) -> Result<Vec<E>> {
        let order = E::default_order();

        if self.is_online().await {
            match self
                .remote
                .select(E::TABLE, filter.clone(), Some(order.clone()))
                .await
            {
                Ok(records) => {
                    for record in &records {
                        if Key::of(record).is_none() {
                            warn!(table = %E::TABLE, "remote record without id not cached");
                            continue;
                        }
                        self.store
                            .insert(E::TABLE, with_synced(record.clone(), 1))
                            .await?;
                    }
                    return records
                        .into_iter()
                        .map(|r| from_record(r).map_err(Error::from))
                        .collect();
                }
                Err(e) => warn!(table = %E::TABLE, error = %e, "remote read failed, using cache"),
            }
        }

        self.store
            .query(E::TABLE, filter, Some(order))
            .await?
            .into_iter()
            .map(|r| from_record(r).map_err(Error::from))
            .collect()
    }

    pub async fn get(&self, id: &str) -> Result<Option<E>> {
        let mut found = self.read_all(Filter::new().eq(PRIMARY_KEY, id)).await?;
        Ok(if found.is_empty() {
            None
        } else {
            Some(found.swap_remove(0))
        })
    }

    /// Merges `patch` into the record with this id.
    pub async fn update(&self, id: &str, patch: Record) -> Result<()> {
        if id.trim().is_empty() {
            return Err(Error::Validation(MISSING_ID.into()));
        }
        E::validate_patch(&patch)?;

        let mut remote_patch = without(&patch, &E::remote_exclusions());
        remote_patch.remove(PRIMARY_KEY);

        let local = without(&patch, &[PRIMARY_KEY]);

        if self.can_write_through(id).await? {
            match self
                .remote
                .update(E::TABLE, id.to_string(), remote_patch.clone())
                .await
            {
                Ok(()) => {
                    self.store
                        .update(E::TABLE, Key::from(id), with_synced(local, 1))
                        .await?;
                    debug!(table = %E::TABLE, id, "updated remotely");
                    return Ok(());
                }
                Err(e) => {
                    warn!(table = %E::TABLE, id, error = %e, "remote update failed, queued")
                }
            }
        }

        self.store
            .update(E::TABLE, Key::from(id), with_synced(local, 0))
            .await?;
        self.queue
            .append(E::TABLE, id, Action::Update, &remote_patch)
            .await?;
        debug!(table = %E::TABLE, id, "updated locally");
        Ok(())
    }

    /// Deletes the record. The local copy goes immediately, whatever the
    /// remote says.
    pub async fn delete(&self, id: &str) -> Result<()> {
        if id.trim().is_empty() {
            return Err(Error::Validation(MISSING_ID.into()));
        }

        if self.can_write_through(id).await? {
            match self.remote.delete(E::TABLE, id.to_string()).await {
                Ok(()) => {
                    self.store.remove(E::TABLE, Key::from(id)).await?;
                    debug!(table = %E::TABLE, id, "deleted remotely");
                    return Ok(());
                }
                Err(e) if e.is_not_found() => {
                    self.store.remove(E::TABLE, Key::from(id)).await?;
                    return Ok(());
                }
                Err(e) => {
                    warn!(table = %E::TABLE, id, error = %e, "remote delete failed, queued")
                }
            }
        }

        self.store.remove(E::TABLE, Key::from(id)).await?;
        let mut payload = Record::new();
        payload.insert(PRIMARY_KEY.into(), id.into());
        self.queue
            .append(E::TABLE, id, Action::Delete, &payload)
            .await?;
        debug!(table = %E::TABLE, id, "deleted locally");
        Ok(())
    }
}

#[cfg(test)]
#[path = "entity_tests.rs"]
mod tests;
