use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use super::memory::{poisoned, TableSet};
use super::{Query, Record, RecordId, Store, StoreError};

/// File-backed store. Tables live in memory and the whole set is rewritten to a JSON file
/// after every successful write; the file is read back when the store is opened.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
    tables: Arc<Mutex<TableSet>>,
}

impl SnapshotStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let tables = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|err| io_unavailable(&path, err))?;
            if raw.trim().is_empty() {
                TableSet::default()
            } else {
                serde_json::from_str(&raw).map_err(|err| {
                    StoreError::Unavailable(format!(
                        "snapshot {} is not valid JSON: {err}",
                        path.display()
                    ))
                })?
            }
        } else {
            TableSet::default()
        };

        debug!(path = %path.display(), "snapshot store opened");

        Ok(Self {
            path,
            tables: Arc::new(Mutex::new(tables)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tables(&self) -> Result<MutexGuard<'_, TableSet>, StoreError> {
        self.tables.lock().map_err(poisoned)
    }

    /// Writes to a sibling temp file then renames it over the snapshot.
    fn flush(&self, tables: &TableSet) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| io_unavailable(parent, err))?;
            }
        }

        let staging = self.path.with_extension("json.tmp");
        let file = fs::File::create(&staging).map_err(|err| io_unavailable(&staging, err))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, tables).map_err(|err| {
            StoreError::Unavailable(format!("failed to encode snapshot: {err}"))
        })?;
        writer
            .flush()
            .map_err(|err| io_unavailable(&staging, err))?;
        fs::rename(&staging, &self.path).map_err(|err| io_unavailable(&self.path, err))
    }

    /// Runs a mutation against a scratch copy and only commits it once the flush succeeds.
    fn write<T>(
        &self,
        mutate: impl FnOnce(&mut TableSet) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.tables()?;
        let mut next = guard.clone();
        let value = mutate(&mut next)?;
        self.flush(&next)?;
        *guard = next;
        Ok(value)
    }
}

fn io_unavailable(path: &Path, err: std::io::Error) -> StoreError {
    StoreError::Unavailable(format!("snapshot io error at {}: {err}", path.display()))
}

impl Store for SnapshotStore {
    fn insert<R: Record>(&self, record: R) -> Result<R, StoreError> {
        self.write(|tables| tables.insert(record))
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
        self.write(|tables| tables.update(id, patch))
    }

    fn delete<R: Record>(&self, id: &RecordId) -> Result<(), StoreError> {
        self.write(|tables| tables.delete::<R>(id))
    }
}
