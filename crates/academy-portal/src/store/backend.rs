use tracing::info;

use super::{
    InMemoryStore, Query, Record, RecordId, SnapshotStore, Store, StoreError, UnconfiguredStore,
};
use crate::config::{StoreBackend, StoreConfig};

/// Store strategy selected at startup.
#[derive(Debug, Clone)]
pub enum PortalStore {
    Memory(InMemoryStore),
    Snapshot(SnapshotStore),
    Unconfigured(UnconfiguredStore),
}

impl PortalStore {
    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        let store = match config.backend {
            StoreBackend::Memory => Self::Memory(InMemoryStore::new()),
            StoreBackend::Snapshot => Self::Snapshot(SnapshotStore::open(&config.snapshot_path)?),
            StoreBackend::Disabled => Self::Unconfigured(UnconfiguredStore),
        };
        info!(backend = store.label(), "persistence backend selected");
        Ok(store)
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Snapshot(_) => "snapshot",
            Self::Unconfigured(_) => "disabled",
        }
    }
}

impl Store for PortalStore {
    fn insert<R: Record>(&self, record: R) -> Result<R, StoreError> {
        match self {
            Self::Memory(store) => store.insert(record),
            Self::Snapshot(store) => store.insert(record),
            Self::Unconfigured(store) => store.insert(record),
        }
    }

    fn select<R: Record>(&self, query: &Query) -> Result<Vec<R>, StoreError> {
        match self {
            Self::Memory(store) => store.select(query),
            Self::Snapshot(store) => store.select(query),
            Self::Unconfigured(store) => store.select(query),
        }
    }

    fn fetch<R: Record>(&self, id: &RecordId) -> Result<Option<R>, StoreError> {
        match self {
            Self::Memory(store) => store.fetch(id),
            Self::Snapshot(store) => store.fetch(id),
            Self::Unconfigured(store) => store.fetch(id),
        }
    }

    fn update<R, F>(&self, id: &RecordId, patch: F) -> Result<R, StoreError>
    where
        R: Record,
        F: FnOnce(&mut R),
    {
        match self {
            Self::Memory(store) => store.update(id, patch),
            Self::Snapshot(store) => store.update(id, patch),
            Self::Unconfigured(store) => store.update(id, patch),
        }
    }

    fn delete<R: Record>(&self, id: &RecordId) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.delete::<R>(id),
            Self::Snapshot(store) => store.delete::<R>(id),
            Self::Unconfigured(store) => store.delete::<R>(id),
        }
    }

    fn is_configured(&self) -> bool {
        !matches!(self, Self::Unconfigured(_))
    }
}
