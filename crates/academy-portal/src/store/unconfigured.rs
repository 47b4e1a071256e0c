use super::{Query, Record, RecordId, Store, StoreError};

const REASON: &str = "persistence backend is not configured (set PORTAL_STORE)";

/// Stand-in used when persistence is switched off. Every call fails fast with
/// [`StoreError::Unavailable`]; read paths in the services degrade that to empty results.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredStore;

impl Store for UnconfiguredStore {
    fn insert<R: Record>(&self, _record: R) -> Result<R, StoreError> {
        Err(StoreError::Unavailable(REASON.to_string()))
    }

    fn select<R: Record>(&self, _query: &Query) -> Result<Vec<R>, StoreError> {
        Err(StoreError::Unavailable(REASON.to_string()))
    }

    fn fetch<R: Record>(&self, _id: &RecordId) -> Result<Option<R>, StoreError> {
        Err(StoreError::Unavailable(REASON.to_string()))
    }

    fn update<R, F>(&self, _id: &RecordId, _patch: F) -> Result<R, StoreError>
    where
        R: Record,
        F: FnOnce(&mut R),
    {
        Err(StoreError::Unavailable(REASON.to_string()))
    }

    fn delete<R: Record>(&self, _id: &RecordId) -> Result<(), StoreError> {
        Err(StoreError::Unavailable(REASON.to_string()))
    }

    fn is_configured(&self) -> bool {
        false
    }
}
