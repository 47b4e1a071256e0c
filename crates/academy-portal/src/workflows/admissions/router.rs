use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch},
    Router,
};
use serde_json::json;

use super::domain::{ApplicationSubmission, StatusUpdateRequest};
use super::intake::ValidationError;
use super::notifier::TransitionNotifier;
use super::search::{ApplicationFilter, ApplicationQuery};
use super::service::{AdmissionsError, ApplicationReviewService};
use crate::access::MaybeActor;
use crate::store::Store;

/// Router builder exposing HTTP endpoints for intake and review.
pub fn application_router<S, N>(service: Arc<ApplicationReviewService<S, N>>) -> Router
where
    S: Store + 'static,
    N: TransitionNotifier + 'static,
{
    Router::new()
        .route(
            "/api/v1/applications",
            get(list_handler::<S, N>).post(submit_handler::<S, N>),
        )
        .route("/api/v1/applications/stats", get(stats_handler::<S, N>))
        .route(
            "/api/v1/applications/export.csv",
            get(export_handler::<S, N>),
        )
        .route(
            "/api/v1/applications/:application_id",
            get(detail_handler::<S, N>),
        )
        .route(
            "/api/v1/applications/:application_id/status",
            patch(status_update_handler::<S, N>),
        )
        .with_state(service)
}

fn error_response(error: AdmissionsError) -> Response {
    let payload = json!({
        "error": error.to_string(),
        "kind": error.kind(),
    });
    (error.status_code(), axum::Json(payload)).into_response()
}

fn malformed(part: &'static str, reason: String) -> AdmissionsError {
    AdmissionsError::Validation(ValidationError::MalformedRequest { part, reason })
}

fn read_body<T>(body: Result<axum::Json<T>, JsonRejection>) -> Result<T, AdmissionsError> {
    body.map(|axum::Json(value)| value)
        .map_err(|rejection| malformed("body", rejection.body_text()))
}

fn read_filter(
    query: Result<Query<ApplicationQuery>, QueryRejection>,
) -> Result<ApplicationFilter, AdmissionsError> {
    let Query(query) = query.map_err(|rejection| malformed("query", rejection.body_text()))?;
    query.into_filter().map_err(AdmissionsError::from)
}

pub(crate) async fn submit_handler<S, N>(
    State(service): State<Arc<ApplicationReviewService<S, N>>>,
    body: Result<axum::Json<ApplicationSubmission>, JsonRejection>,
) -> Response
where
    S: Store + 'static,
    N: TransitionNotifier + 'static,
{
    match read_body(body).and_then(|submission| service.submit(submission)) {
        Ok(application) => (StatusCode::CREATED, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler<S, N>(
    State(service): State<Arc<ApplicationReviewService<S, N>>>,
    query: Result<Query<ApplicationQuery>, QueryRejection>,
) -> Response
where
    S: Store + 'static,
    N: TransitionNotifier + 'static,
{
    let filter = match read_filter(query) {
        Ok(filter) => filter,
        Err(error) => return error_response(error),
    };
    let applications = service.list(&filter);
    (StatusCode::OK, axum::Json(applications)).into_response()
}

pub(crate) async fn stats_handler<S, N>(
    State(service): State<Arc<ApplicationReviewService<S, N>>>,
) -> Response
where
    S: Store + 'static,
    N: TransitionNotifier + 'static,
{
    (StatusCode::OK, axum::Json(service.stats())).into_response()
}

pub(crate) async fn detail_handler<S, N>(
    State(service): State<Arc<ApplicationReviewService<S, N>>>,
    Path(application_id): Path<String>,
) -> Response
where
    S: Store + 'static,
    N: TransitionNotifier + 'static,
{
    match service.find(&application_id) {
        Some(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        None => error_response(AdmissionsError::NotFound(application_id)),
    }
}

pub(crate) async fn status_update_handler<S, N>(
    State(service): State<Arc<ApplicationReviewService<S, N>>>,
    Path(application_id): Path<String>,
    MaybeActor(actor): MaybeActor,
    body: Result<axum::Json<StatusUpdateRequest>, JsonRejection>,
) -> Response
where
    S: Store + 'static,
    N: TransitionNotifier + 'static,
{
    let update = match read_body(body)
        .and_then(|request| request.into_update().map_err(AdmissionsError::from))
    {
        Ok(update) => update,
        Err(error) => return error_response(error),
    };

    match service.update_status(&application_id, update, actor.as_ref()) {
        Ok(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn export_handler<S, N>(
    State(service): State<Arc<ApplicationReviewService<S, N>>>,
    query: Result<Query<ApplicationQuery>, QueryRejection>,
) -> Response
where
    S: Store + 'static,
    N: TransitionNotifier + 'static,
{
    let filter = match read_filter(query) {
        Ok(filter) => filter,
        Err(error) => return error_response(error),
    };
    let mut buffer = Vec::new();
    match service.export_csv(&filter, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            buffer,
        )
            .into_response(),
        Err(err) => {
            let payload = json!({ "error": format!("failed to render export: {err}") });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
