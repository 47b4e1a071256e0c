//! Row store used by every workflow.
//!
//! Records are kept as JSON rows grouped by table name, mirroring the hosted relational store
//! the portal was designed around. Workflows only see the [`Store`] trait; which strategy backs
//! it is decided once at startup from configuration (see [`PortalStore`]).

mod backend;
mod ids;
mod memory;
mod query;
mod snapshot;
mod unconfigured;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use backend::PortalStore;
pub use ids::{is_valid_identifier, RecordId};
pub use memory::InMemoryStore;
pub use query::{Direction, Query};
pub use snapshot::SnapshotStore;
pub use unconfigured::UnconfiguredStore;

/// A typed row living in a named table.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const TABLE: &'static str;

    fn id(&self) -> &RecordId;
}

/// Persistence collaborator consumed by the workflow services.
///
/// Each write touches exactly one row and is atomic with respect to other writes on the same
/// store. Concurrent updates to the same row are last-write-wins.
pub trait Store: Send + Sync {
    fn insert<R: Record>(&self, record: R) -> Result<R, StoreError>;

    fn select<R: Record>(&self, query: &Query) -> Result<Vec<R>, StoreError>;

    fn fetch<R: Record>(&self, id: &RecordId) -> Result<Option<R>, StoreError>;

    /// Applies `patch` to the stored row and returns the updated record.
    fn update<R, F>(&self, id: &RecordId, patch: F) -> Result<R, StoreError>
    where
        R: Record,
        F: FnOnce(&mut R);

    fn delete<R: Record>(&self, id: &RecordId) -> Result<(), StoreError>;

    /// `false` when persistence is switched off and every call will fail fast.
    fn is_configured(&self) -> bool {
        true
    }
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists in {table}")]
    Conflict { table: &'static str },
    #[error("record not found in {table}")]
    NotFound { table: &'static str },
    #[error("persistence unavailable: {0}")]
    Unavailable(String),
    #[error("stored row in {table} could not be decoded: {source}")]
    Corrupt {
        table: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
