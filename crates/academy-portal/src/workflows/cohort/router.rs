use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;

use super::domain::{
    AnnouncementDraft, AnnouncementStats, MilestoneDraft, MilestoneFilter, MilestoneStats,
};
use super::service::CohortService;
use crate::store::Store;
use crate::workflows::error::{JsonBody, WorkflowError};

type SharedCohort<S> = State<Arc<CohortService<S>>>;

#[derive(Debug, Serialize)]
struct CohortStats {
    milestones: MilestoneStats,
    announcements: AnnouncementStats,
}

pub fn cohort_router<S: Store + 'static>(service: Arc<CohortService<S>>) -> Router {
    Router::new()
        .route(
            "/api/v1/milestones",
            get(list_milestones::<S>).post(create_milestone::<S>),
        )
        .route(
            "/api/v1/milestones/:milestone_id",
            put(update_milestone::<S>).delete(delete_milestone::<S>),
        )
        .route(
            "/api/v1/milestones/:milestone_id/toggle",
            post(toggle_milestone::<S>),
        )
        .route(
            "/api/v1/announcements",
            get(list_announcements::<S>).post(create_announcement::<S>),
        )
        .route(
            "/api/v1/announcements/:announcement_id",
            put(update_announcement::<S>).delete(delete_announcement::<S>),
        )
        .route(
            "/api/v1/announcements/:announcement_id/read",
            post(mark_read::<S>),
        )
        .route("/api/v1/cohort/stats", get(stats::<S>))
        .with_state(service)
}

async fn list_milestones<S: Store + 'static>(
    State(service): SharedCohort<S>,
    Query(filter): Query<MilestoneFilter>,
) -> impl IntoResponse {
    Json(service.list_milestones(&filter))
}

async fn create_milestone<S: Store + 'static>(
    State(service): SharedCohort<S>,
    JsonBody(draft): JsonBody<MilestoneDraft>,
) -> Result<impl IntoResponse, WorkflowError> {
    let milestone = service.create_milestone(draft)?;
    Ok((StatusCode::CREATED, Json(milestone)))
}

async fn update_milestone<S: Store + 'static>(
    State(service): SharedCohort<S>,
    Path(milestone_id): Path<String>,
    JsonBody(draft): JsonBody<MilestoneDraft>,
) -> Result<impl IntoResponse, WorkflowError> {
    Ok(Json(service.update_milestone(&milestone_id, draft)?))
}

async fn toggle_milestone<S: Store + 'static>(
    State(service): SharedCohort<S>,
    Path(milestone_id): Path<String>,
) -> Result<impl IntoResponse, WorkflowError> {
    Ok(Json(service.toggle_milestone(&milestone_id)?))
}

async fn delete_milestone<S: Store + 'static>(
    State(service): SharedCohort<S>,
    Path(milestone_id): Path<String>,
) -> Result<StatusCode, WorkflowError> {
    service.delete_milestone(&milestone_id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_announcements<S: Store + 'static>(
    State(service): SharedCohort<S>,
) -> impl IntoResponse {
    Json(service.list_announcements())
}

async fn create_announcement<S: Store + 'static>(
    State(service): SharedCohort<S>,
    JsonBody(draft): JsonBody<AnnouncementDraft>,
) -> Result<impl IntoResponse, WorkflowError> {
    let announcement = service.create_announcement(draft)?;
    Ok((StatusCode::CREATED, Json(announcement)))
}

async fn update_announcement<S: Store + 'static>(
    State(service): SharedCohort<S>,
    Path(announcement_id): Path<String>,
    JsonBody(draft): JsonBody<AnnouncementDraft>,
) -> Result<impl IntoResponse, WorkflowError> {
    Ok(Json(service.update_announcement(&announcement_id, draft)?))
}

async fn mark_read<S: Store + 'static>(
    State(service): SharedCohort<S>,
    Path(announcement_id): Path<String>,
) -> Result<impl IntoResponse, WorkflowError> {
    Ok(Json(service.mark_read(&announcement_id)?))
}

async fn delete_announcement<S: Store + 'static>(
    State(service): SharedCohort<S>,
    Path(announcement_id): Path<String>,
) -> Result<StatusCode, WorkflowError> {
    service.delete_announcement(&announcement_id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn stats<S: Store + 'static>(State(service): SharedCohort<S>) -> impl IntoResponse {
    let now = Utc::now();
    Json(CohortStats {
        milestones: service.milestone_stats(now.date_naive()),
        announcements: service.announcement_stats(now),
    })
}
