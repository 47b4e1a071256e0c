use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use super::domain::ApplicationStatus;
use crate::store::RecordId;

/// A committed status change, handed to the notifier after the write succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusTransition {
    pub application_id: RecordId,
    pub from: ApplicationStatus,
    pub to: ApplicationStatus,
    pub reviewed_by: Option<String>,
    pub reviewed_at: DateTime<Utc>,
}

/// Outbound hook for status changes (e-mail, chat, audit sinks).
pub trait TransitionNotifier: Send + Sync {
    fn notify(&self, transition: &StatusTransition) -> Result<(), NotifierError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Writes each transition to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl TransitionNotifier for TracingNotifier {
    fn notify(&self, transition: &StatusTransition) -> Result<(), NotifierError> {
        info!(
            application_id = %transition.application_id,
            from = transition.from.label(),
            to = transition.to.label(),
            reviewed_by = transition.reviewed_by.as_deref().unwrap_or("unknown"),
            "application status changed"
        );
        Ok(())
    }
}
