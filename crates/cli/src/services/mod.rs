// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Business-facing services, wired once at startup.

mod entity;

use std::sync::Arc;

use eq_core::{
    Filter, Participant, Personne, Session, SessionParticipant, StoreHandle, SyncQueue, Table,
};

pub use entity::EntityService;

use crate::error::Result;
use crate::sync::{Connectivity, NetworkMonitor, RemoteBackend, SyncEngine};

/// Every service sharing one store handle, queue, remote and
/// connectivity source.
#[derive(Clone)]
pub struct Services {
    pub store: StoreHandle,
    pub queue: SyncQueue,
    pub participants: EntityService<Participant>,
    pub sessions: EntityService<Session>,
    pub personnes: EntityService<Personne>,
    pub session_participants: EntityService<SessionParticipant>,
    pub engine: Arc<SyncEngine>,
    connectivity: Arc<dyn Connectivity>,
}

impl Services {
    pub fn new(
        store: StoreHandle,
        remote: Arc<dyn RemoteBackend>,
        connectivity: Arc<dyn Connectivity>,
    ) -> Self {
        let queue = SyncQueue::new(store.clone());
        let participants = EntityService::new(
            store.clone(),
            queue.clone(),
            Arc::clone(&remote),
            Arc::clone(&connectivity),
        );
        let sessions = EntityService::new(
            store.clone(),
            queue.clone(),
            Arc::clone(&remote),
            Arc::clone(&connectivity),
        );
        let personnes = EntityService::new(
            store.clone(),
            queue.clone(),
            Arc::clone(&remote),
            Arc::clone(&connectivity),
        );
        let session_participants = EntityService::new(
            store.clone(),
            queue.clone(),
            Arc::clone(&remote),
            Arc::clone(&connectivity),
        );
        let engine = Arc::new(SyncEngine::new(
            store.clone(),
            queue.clone(),
            Arc::clone(&remote),
        ));

        Services {
            store,
            queue,
            participants,
            sessions,
            personnes,
            session_participants,
            engine,
            connectivity,
        }
    }

    /// A monitor over this bundle's engine and connectivity source.
    pub fn monitor(&self) -> NetworkMonitor {
        NetworkMonitor::new(Arc::clone(&self.engine), Arc::clone(&self.connectivity))
    }

    /// Record counts per table, in `Table::ALL` order.
    pub async fn counts(&self) -> Result<Vec<(Table, usize)>> {
        let mut counts = Vec::with_capacity(Table::ALL.len());
        for table in Table::ALL {
            let rows = self.store.query(table, Filter::new(), None).await?;
            counts.push((table, rows.len()));
        }
        Ok(counts)
    }

    /// Empties the entity tables and the queue, as the "clear local
    /// cache" setting does.
    pub async fn clear_cache(&self) -> Result<()> {
        for table in Table::ALL {
            self.store.clear(table).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
