//! Application intake and the admissions review engine.
//!
//! Applicants submit a form that always lands as `pending`; administrators move it through
//! the five review statuses, and every committed transition stamps the reviewer and time
//! before the [`TransitionNotifier`] hears about it.

pub mod domain;
pub mod export;
pub(crate) mod intake;
pub mod notifier;
pub mod router;
pub mod search;
pub mod service;
pub mod stats;

#[cfg(test)]
mod tests;

pub use domain::{
    Application, ApplicationStatus, ApplicationSubmission, StatusUpdate, StatusUpdateRequest,
};
pub use export::write_applications_csv;
pub use intake::ValidationError;
pub use notifier::{NotifierError, StatusTransition, TracingNotifier, TransitionNotifier};
pub use router::application_router;
pub use search::{ApplicationFilter, ApplicationQuery};
pub use service::{AdmissionsError, ApplicationReviewService, ReviewPolicy};
pub use stats::ApplicationStats;
