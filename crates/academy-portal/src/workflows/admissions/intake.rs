use tracing::debug;

use super::domain::ApplicationSubmission;
use crate::store::RecordId;

/// Validation errors raised before an application reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    MissingField { field: &'static str },
    #[error("'{value}' is not a recognised application status")]
    UnknownStatus { value: String },
    #[error("program {program_id} does not exist")]
    UnknownProgram { program_id: RecordId },
    #[error("request {part} is invalid: {reason}")]
    MalformedRequest { part: &'static str, reason: String },
}

/// Submission after trimming, required-field checks, and foreign key sanitizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedSubmission {
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
}

/// Guard applied to every submission, both at the HTTP edge and inside the service.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntakeGuard;

impl IntakeGuard {
    pub fn sanitize(
        &self,
        submission: ApplicationSubmission,
    ) -> Result<SanitizedSubmission, ValidationError> {
        let ApplicationSubmission {
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
        } = submission;

        let sanitized_program = RecordId::parse_optional(program_id.as_deref());
        if sanitized_program.is_none() {
            if let Some(raw) = program_id.as_deref().filter(|raw| !raw.trim().is_empty()) {
                debug!(program_id = raw, "dropping malformed program reference");
            }
        }

        Ok(SanitizedSubmission {
            full_name: required("full_name", full_name)?,
            email: required("email", email)?,
            phone: required("phone", phone)?,
            country: required("country", country)?,
            program_id: sanitized_program,
            program_title: optional(program_title),
            preferred_schedule: required("preferred_schedule", preferred_schedule)?,
            desired_start_term: optional(desired_start_term),
            payment_plan: optional(payment_plan),
            testimony: required("testimony", testimony)?,
            ministry_context: optional(ministry_context),
            reference_name: required("reference_name", reference_name)?,
            reference_relationship: required("reference_relationship", reference_relationship)?,
            reference_email: required("reference_email", reference_email)?,
            reference_phone: optional(reference_phone),
            reference_notes: optional(reference_notes),
        })
    }
}

fn required(field: &'static str, value: String) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField { field });
    }
    Ok(trimmed.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}
