use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::warn;

use crate::store::{RecordId, StoreError};

/// Error raised by the catalog, cohort, curriculum, student and role services.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    #[error("{entity} '{id}' was not found")]
    NotFound { entity: &'static str, id: String },
    #[error("{0}")]
    Conflict(String),
    #[error("persistence unavailable: {0}")]
    PersistenceUnavailable(String),
    #[error("a signed-in user is required to {0}")]
    Unauthorized(&'static str),
}

impl WorkflowError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::PersistenceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }
}

impl From<StoreError> for WorkflowError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound { table } => Self::NotFound {
                entity: table,
                id: "requested".to_string(),
            },
            StoreError::Conflict { .. } => Self::Conflict(value.to_string()),
            StoreError::Unavailable(_) | StoreError::Corrupt { .. } => {
                Self::PersistenceUnavailable(value.to_string())
            }
        }
    }
}

impl IntoResponse for WorkflowError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// JSON request body whose rejections surface as a `Validation` error with the usual JSON
/// error body.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = WorkflowError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| Self(value))
            .map_err(|rejection| WorkflowError::invalid("body", rejection.body_text()))
    }
}

/// Maps a row-level `NotFound` to an error naming the id the caller asked for.
pub(crate) trait StoreResultExt<T> {
    fn or_missing(self, entity: &'static str, id: &RecordId) -> Result<T, WorkflowError>;
}

impl<T> StoreResultExt<T> for Result<T, StoreError> {
    fn or_missing(self, entity: &'static str, id: &RecordId) -> Result<T, WorkflowError> {
        self.map_err(|err| match err {
            StoreError::NotFound { .. } => WorkflowError::missing(entity, id),
            other => other.into(),
        })
    }
}

/// Read paths keep display surfaces alive: failures are logged and replaced by the default.
pub(crate) fn degrade<T: Default>(result: Result<T, StoreError>, context: &'static str) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, context, "read degraded to empty result");
            T::default()
        }
    }
}

/// Parses an id from a path segment, treating malformed ids as missing rows.
pub(crate) fn require_id(entity: &'static str, raw: &str) -> Result<RecordId, WorkflowError> {
    RecordId::parse(raw).ok_or_else(|| WorkflowError::missing(entity, raw))
}

/// Trims a mandatory text field, rejecting blanks.
pub(crate) fn required_text(field: &'static str, raw: &str) -> Result<String, WorkflowError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(WorkflowError::invalid(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// Trims an optional text field; blank values become `None`.
pub(crate) fn optional_text(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
