use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Length of a canonical hyphenated UUID (`8-4-4-4-12`).
const CANONICAL_ID_LEN: usize = 36;

/// Returns `true` when `raw` is a canonical hyphenated UUID.
///
/// This is the single gate every externally supplied identifier passes through before it is
/// used as a key or persisted as a foreign key. The braced, URN and un-hyphenated forms that
/// `Uuid::try_parse` also accepts are rejected.
pub fn is_valid_identifier(raw: &str) -> bool {
    raw.len() == CANONICAL_ID_LEN && Uuid::try_parse(raw).is_ok()
}

/// Row identifier shared by every table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().hyphenated().to_string())
    }

    /// Accepts untrusted input, returning `None` for anything that is not a canonical id.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        is_valid_identifier(trimmed).then(|| Self(trimmed.to_ascii_lowercase()))
    }

    /// Like [`RecordId::parse`] but for optional foreign keys, where blanks and malformed
    /// values both collapse to `None`.
    pub fn parse_optional(raw: Option<&str>) -> Option<Self> {
        raw.and_then(Self::parse)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
