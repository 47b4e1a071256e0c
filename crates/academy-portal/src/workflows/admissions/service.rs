use std::io::Write;
use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::domain::{Application, ApplicationStatus, ApplicationSubmission, StatusUpdate};
use super::export::write_applications_csv;
use super::intake::{IntakeGuard, SanitizedSubmission, ValidationError};
use super::notifier::{StatusTransition, TransitionNotifier};
use super::search::ApplicationFilter;
use super::stats::ApplicationStats;
use crate::access::Actor;
use crate::config::ReviewConfig;
use crate::store::{Query, RecordId, Store, StoreError};
use crate::workflows::catalog::Program;
use crate::workflows::error::degrade;

/// How strictly status updates treat a missing reviewer identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewPolicy {
    pub require_reviewer: bool,
}

impl From<&ReviewConfig> for ReviewPolicy {
    fn from(config: &ReviewConfig) -> Self {
        Self {
            require_reviewer: config.require_reviewer,
        }
    }
}

/// Service composing intake validation, the store, and the transition hook.
pub struct ApplicationReviewService<S, N> {
    guard: IntakeGuard,
    store: Arc<S>,
    notifier: Arc<N>,
    policy: ReviewPolicy,
}

impl<S, N> ApplicationReviewService<S, N>
where
    S: Store + 'static,
    N: TransitionNotifier + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>, policy: ReviewPolicy) -> Self {
        Self {
            guard: IntakeGuard,
            store,
            notifier,
            policy,
        }
    }

    pub fn policy(&self) -> ReviewPolicy {
        self.policy
    }

    /// Submit a new application; it always starts out `pending`.
    pub fn submit(
        &self,
        submission: ApplicationSubmission,
    ) -> Result<Application, AdmissionsError> {
        self.submit_at(submission, Utc::now())
    }

    pub fn submit_at(
        &self,
        submission: ApplicationSubmission,
        now: DateTime<Utc>,
    ) -> Result<Application, AdmissionsError> {
        let sanitized = self.guard.sanitize(submission)?;
        let program_title = self.resolve_program_title(&sanitized)?;

        let SanitizedSubmission {
            full_name,
            email,
            phone,
            country,
            program_id,
            program_title: _,
            preferred_schedule,
            desired_start_term,
            payment_plan,
            testimony,
            ministry_context,
            reference_name,
            reference_relationship,
            reference_email,
            reference_phone,
            reference_notes,
        } = sanitized;

        let application = Application {
            id: RecordId::generate(),
            full_name,
            email,
            phone,
            country,
            program_id,
            program_title,
            preferred_schedule,
            desired_start_term,
            payment_plan,
            testimony,
            ministry_context,
            reference_name,
            reference_relationship,
            reference_email,
            reference_phone,
            reference_notes,
            status: ApplicationStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            admin_notes: None,
            created_at: now,
            updated_at: now,
        };

        let stored = self
            .store
            .insert(application)
            .map_err(AdmissionsError::from_write)?;
        info!(application_id = %stored.id, "application submitted");
        Ok(stored)
    }

    /// A resolvable program supplies the title snapshot when the applicant left it blank.
    fn resolve_program_title(
        &self,
        submission: &SanitizedSubmission,
    ) -> Result<Option<String>, AdmissionsError> {
        let Some(program_id) = submission.program_id.as_ref() else {
            return Ok(submission.program_title.clone());
        };

        let program = self
            .store
            .fetch::<Program>(program_id)
            .map_err(AdmissionsError::from_write)?
            .ok_or_else(|| ValidationError::UnknownProgram {
                program_id: program_id.clone(),
            })?;

        Ok(submission
            .program_title
            .clone()
            .or(Some(program.title)))
    }

    /// Applications matching `filter`, newest first. Store failures yield an empty list.
    pub fn list(&self, filter: &ApplicationFilter) -> Vec<Application> {
        let applications: Vec<Application> =
            degrade(self.store.select(&filter.query()), "list applications");
        applications
            .into_iter()
            .filter(|application| filter.matches(application))
            .collect()
    }

    pub fn find(&self, application_id: &str) -> Option<Application> {
        let id = RecordId::parse(application_id)?;
        degrade(self.store.fetch(&id), "fetch application")
    }

    pub fn stats(&self) -> ApplicationStats {
        let applications: Vec<Application> =
            degrade(self.store.select(&Query::new()), "application stats");
        ApplicationStats::from_applications(&applications)
    }

    /// Record an administrator decision.
    pub fn update_status(
        &self,
        application_id: &str,
        update: StatusUpdate,
        actor: Option<&Actor>,
    ) -> Result<Application, AdmissionsError> {
        self.update_status_at(application_id, update, actor, Utc::now())
    }

    pub fn update_status_at(
        &self,
        application_id: &str,
        update: StatusUpdate,
        actor: Option<&Actor>,
        now: DateTime<Utc>,
    ) -> Result<Application, AdmissionsError> {
        let id = RecordId::parse(application_id)
            .ok_or_else(|| AdmissionsError::NotFound(application_id.trim().to_string()))?;
        // Existence is checked before the reviewer so unknown ids read as 404 under any policy.
        if self
            .store
            .fetch::<Application>(&id)
            .map_err(AdmissionsError::from_write)?
            .is_none()
        {
            return Err(AdmissionsError::NotFound(id.to_string()));
        }

        let reviewer = match actor {
            Some(actor) => Some(actor.user_id().to_string()),
            None if self.policy.require_reviewer => return Err(AdmissionsError::Unauthorized),
            None => {
                warn!(application_id = %id, "status update without a reviewer identity");
                None
            }
        };

        let StatusUpdate {
            status,
            admin_notes,
        } = update;
        let mut previous = status;

        let updated = self
            .store
            .update(&id, |row: &mut Application| {
                previous = row.status;
                row.status = status;
                if let Some(notes) = admin_notes {
                    let notes = notes.trim();
                    row.admin_notes = (!notes.is_empty()).then(|| notes.to_string());
                }
                row.reviewed_by = reviewer;
                let reviewed_at = row.reviewed_at.map_or(now, |prior| prior.max(now));
                row.reviewed_at = Some(reviewed_at);
                row.updated_at = row.updated_at.max(reviewed_at);
            })
            .map_err(|err| match err {
                StoreError::NotFound { .. } => AdmissionsError::NotFound(id.to_string()),
                other => AdmissionsError::from_write(other),
            })?;

        info!(
            application_id = %updated.id,
            from = previous.label(),
            to = updated.status.label(),
            "application status updated"
        );

        let transition = StatusTransition {
            application_id: updated.id.clone(),
            from: previous,
            to: updated.status,
            reviewed_by: updated.reviewed_by.clone(),
            reviewed_at: updated.reviewed_at.unwrap_or(now),
        };
        if let Err(err) = self.notifier.notify(&transition) {
            warn!(error = %err, application_id = %updated.id, "status notification failed");
        }

        Ok(updated)
    }

    /// Export the filtered list as CSV, returning the number of rows written.
    pub fn export_csv<W: Write>(
        &self,
        filter: &ApplicationFilter,
        writer: W,
    ) -> Result<usize, csv::Error> {
        let applications = self.list(filter);
        write_applications_csv(&applications, writer)
    }
}

/// Error raised by the application review service.
#[derive(Debug, thiserror::Error)]
pub enum AdmissionsError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("application '{0}' was not found")]
    NotFound(String),
    #[error("admissions records are unavailable right now: {0}")]
    PersistenceUnavailable(String),
    #[error("status updates require a signed-in reviewer")]
    Unauthorized,
}

impl AdmissionsError {
    fn from_write(err: StoreError) -> Self {
        Self::PersistenceUnavailable(err.to_string())
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            AdmissionsError::Validation(_) => "validation",
            AdmissionsError::NotFound(_) => "not_found",
            AdmissionsError::PersistenceUnavailable(_) => "persistence_unavailable",
            AdmissionsError::Unauthorized => "unauthorized",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AdmissionsError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AdmissionsError::NotFound(_) => StatusCode::NOT_FOUND,
            AdmissionsError::PersistenceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AdmissionsError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}
