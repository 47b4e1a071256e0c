use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Query, Record, RecordId, Store, StoreError};

/// Table name -> row id -> JSON row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct TableSet {
    tables: BTreeMap<String, BTreeMap<String, Value>>,
}

impl TableSet {
    pub(crate) fn insert<R: Record>(&mut self, record: R) -> Result<R, StoreError> {
        let row = encode(&record)?;
        let table = self.tables.entry(R::TABLE.to_string()).or_default();
        let key = record.id().as_str();
        if table.contains_key(key) {
            return Err(StoreError::Conflict { table: R::TABLE });
        }
        table.insert(key.to_string(), row);
        Ok(record)
    }

    pub(crate) fn select<R: Record>(&self, query: &Query) -> Result<Vec<R>, StoreError> {
        let Some(table) = self.tables.get(R::TABLE) else {
            return Ok(Vec::new());
        };

        let mut rows: Vec<Value> = table
            .values()
            .filter(|row| query.matches(row))
            .cloned()
            .collect();
        query.sort(&mut rows);

        rows.into_iter().map(decode::<R>).collect()
    }

    pub(crate) fn fetch<R: Record>(&self, id: &RecordId) -> Result<Option<R>, StoreError> {
        self.tables
            .get(R::TABLE)
            .and_then(|table| table.get(id.as_str()))
            .cloned()
            .map(decode::<R>)
            .transpose()
    }

    pub(crate) fn update<R, F>(&mut self, id: &RecordId, patch: F) -> Result<R, StoreError>
    where
        R: Record,
        F: FnOnce(&mut R),
    {
        let row = self
            .tables
            .get_mut(R::TABLE)
            .and_then(|table| table.get_mut(id.as_str()))
            .ok_or(StoreError::NotFound { table: R::TABLE })?;

        let mut record = decode::<R>(row.clone())?;
        patch(&mut record);
        *row = encode(&record)?;
        Ok(record)
    }

    pub(crate) fn delete<R: Record>(&mut self, id: &RecordId) -> Result<(), StoreError> {
        self.tables
            .get_mut(R::TABLE)
            .and_then(|table| table.remove(id.as_str()))
            .map(|_| ())
            .ok_or(StoreError::NotFound { table: R::TABLE })
    }
}

fn encode<R: Record>(record: &R) -> Result<Value, StoreError> {
    serde_json::to_value(record).map_err(|source| StoreError::Corrupt {
        table: R::TABLE,
        source,
    })
}

fn decode<R: Record>(row: Value) -> Result<R, StoreError> {
    serde_json::from_value(row).map_err(|source| StoreError::Corrupt {
        table: R::TABLE,
        source,
    })
}

pub(crate) fn poisoned<T>(_: std::sync::PoisonError<T>) -> StoreError {
    StoreError::Unavailable("store lock poisoned".to_string())
}

/// Process-local store; contents are lost when the process exits.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    tables: Arc<Mutex<TableSet>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, TableSet>, StoreError> {
        self.tables.lock().map_err(poisoned)
    }
}

impl Store for InMemoryStore {
    fn insert<R: Record>(&self, record: R) -> Result<R, StoreError> {
        self.tables()?.insert(record)
    }

    fn select<R: Record>(&self, query: &Query) -> Result<Vec<R>, StoreError> {
        self.tables()?.select(query)
    }

    fn fetch<R: Record>(&self, id: &RecordId) -> Result<Option<R>, StoreError> {
        self.tables()?.fetch(id)
    }

    fn update<R, F>(&self, id: &RecordId, patch: F) -> Result<R, StoreError>
    where
        R: Record,
        F: FnOnce(&mut R),
    {
        self.tables()?.update(id, patch)
    }

    fn delete<R: Record>(&self, id: &RecordId) -> Result<(), StoreError> {
        self.tables()?.delete::<R>(id)
    }
}
