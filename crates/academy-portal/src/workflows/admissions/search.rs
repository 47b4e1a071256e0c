use serde::Deserialize;

use super::domain::{Application, ApplicationStatus};
use super::intake::ValidationError;
use crate::store::{Direction, Query};

/// Status value the admin screens send for "no status filter".
const ANY_STATUS: &str = "all";

/// Query string accepted by the list and export endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

impl ApplicationQuery {
    pub fn into_filter(self) -> Result<ApplicationFilter, ValidationError> {
        ApplicationFilter::from_params(self.status.as_deref(), self.search)
    }
}

/// Admin list filter: status is pushed down to the store, search runs in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationFilter {
    pub status: Option<ApplicationStatus>,
    pub search: Option<String>,
}

impl ApplicationFilter {
    /// Blank or `all` means every status; anything else must name a known status.
    pub fn from_params(
        status: Option<&str>,
        search: Option<String>,
    ) -> Result<Self, ValidationError> {
        let status = match status.map(str::trim) {
            None | Some("") => None,
            Some(raw) if raw.eq_ignore_ascii_case(ANY_STATUS) => None,
            Some(raw) => Some(ApplicationStatus::parse(raw)?),
        };
        Ok(Self { status, search })
    }

    pub fn with_status(status: ApplicationStatus) -> Self {
        Self {
            status: Some(status),
            search: None,
        }
    }

    pub fn searching(term: impl Into<String>) -> Self {
        Self {
            status: None,
            search: Some(term.into()),
        }
    }

    /// Newest first.
    pub(crate) fn query(&self) -> Query {
        Query::new()
            .eq_opt("status", self.status.map(ApplicationStatus::label))
            .order_by("created_at", Direction::Descending)
    }

    /// Case-insensitive match on applicant name, email, or program title.
    pub fn matches(&self, application: &Application) -> bool {
        let Some(term) = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
        else {
            return true;
        };
        let term = term.to_lowercase();

        application.full_name.to_lowercase().contains(&term)
            || application.email.to_lowercase().contains(&term)
            || application
                .program_title
                .as_deref()
                .is_some_and(|title| title.to_lowercase().contains(&term))
    }
}
