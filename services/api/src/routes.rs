use crate::infra::{AppState, PortalServices};
use academy_portal::access::role_router;
use academy_portal::workflows::admissions::application_router;
use academy_portal::workflows::catalog::catalog_router;
use academy_portal::workflows::cohort::cohort_router;
use academy_portal::workflows::curriculum::curriculum_router;
use academy_portal::workflows::students::student_router;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::json;

/// The full portal surface plus the operational endpoints.
pub(crate) fn portal_routes(services: &PortalServices) -> Router {
    application_router(services.applications.clone())
        .merge(catalog_router(services.catalog.clone()))
        .merge(cohort_router(services.cohort.clone()))
        .merge(curriculum_router(services.curriculum.clone()))
        .merge(student_router(services.students.clone()))
        .merge(role_router(services.roles.clone()))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
