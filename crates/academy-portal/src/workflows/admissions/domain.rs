use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::intake::ValidationError;
use crate::store::{Record, RecordId};

/// Review status of an application. Construct from untrusted text with
/// [`ApplicationStatus::parse`], which reports unknown values as a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Reviewing,
    Approved,
    Rejected,
    Waitlisted,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Reviewing,
        ApplicationStatus::Approved,
        ApplicationStatus::Rejected,
        ApplicationStatus::Waitlisted,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewing => "reviewing",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Waitlisted => "waitlisted",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let normalized = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.label() == normalized)
            .ok_or(ValidationError::UnknownStatus {
                value: raw.trim().to_string(),
            })
    }
}

impl FromStr for ApplicationStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Payload sent by an applicant. Any `status` a caller includes is ignored. Absent
/// required fields deserialize empty so intake names them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationSubmission {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub country: String,
    pub program_id: Option<String>,
    pub program_title: Option<String>,
    pub preferred_schedule: String,
    pub desired_start_term: Option<String>,
    pub payment_plan: Option<String>,
    pub testimony: String,
    pub ministry_context: Option<String>,
    pub reference_name: String,
    pub reference_relationship: String,
    pub reference_email: String,
    pub reference_phone: Option<String>,
    pub reference_notes: Option<String>,
}

/// Persisted admission request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: RecordId,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub country: String,
    pub program_id: Option<RecordId>,
    pub program_title: Option<String>,
    pub preferred_schedule: String,
    pub desired_start_term: Option<String>,
    pub payment_plan: Option<String>,
    pub testimony: String,
    pub ministry_context: Option<String>,
    pub reference_name: String,
    pub reference_relationship: String,
    pub reference_email: String,
    pub reference_phone: Option<String>,
    pub reference_notes: Option<String>,
    pub status: ApplicationStatus,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Application {
    const TABLE: &'static str = "applications";

    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// Administrator decision applied by a status update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: ApplicationStatus,
    /// `None` keeps the current note; `Some` replaces it, and a blank value clears it.
    pub admin_notes: Option<String>,
}

impl StatusUpdate {
    pub fn new(status: ApplicationStatus) -> Self {
        Self {
            status,
            admin_notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.admin_notes = Some(notes.into());
        self
    }
}

/// Wire form of a status update; the status is still unvalidated text.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
    #[serde(default)]
    pub admin_notes: Option<String>,
}

impl StatusUpdateRequest {
    pub fn into_update(self) -> Result<StatusUpdate, ValidationError> {
        Ok(StatusUpdate {
            status: ApplicationStatus::parse(&self.status)?,
            admin_notes: self.admin_notes,
        })
    }
}
