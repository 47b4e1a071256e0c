use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;

use super::domain::{CourseCategory, CourseDraft, Placement, ProgramDraft};
use super::insights::{search_courses, search_programs};
use super::service::CatalogService;
use crate::store::Store;
use crate::workflows::error::{JsonBody, WorkflowError};

type SharedCatalog<S> = State<Arc<CatalogService<S>>>;

#[derive(Debug, Default, Deserialize)]
pub struct ProgramSearch {
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CourseSearch {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<CourseCategory>,
}

pub fn catalog_router<S: Store + 'static>(service: Arc<CatalogService<S>>) -> Router {
    Router::new()
        .route(
            "/api/v1/programs",
            get(list_programs::<S>).post(create_program::<S>),
        )
        .route(
            "/api/v1/programs/:program_id",
            get(get_program::<S>)
                .put(update_program::<S>)
                .delete(delete_program::<S>),
        )
        .route(
            "/api/v1/programs/:program_id/courses",
            get(program_timeline::<S>).post(link_course::<S>),
        )
        .route(
            "/api/v1/program-courses/:link_id",
            delete(unlink_course::<S>),
        )
        .route(
            "/api/v1/courses",
            get(list_courses::<S>).post(create_course::<S>),
        )
        .route(
            "/api/v1/courses/:course_id",
            get(get_course::<S>)
                .put(update_course::<S>)
                .delete(delete_course::<S>),
        )
        .route("/api/v1/catalog/overview", get(overview::<S>))
        .with_state(service)
}

async fn list_programs<S: Store + 'static>(
    State(service): SharedCatalog<S>,
    Query(params): Query<ProgramSearch>,
) -> impl IntoResponse {
    let programs = service.list_programs();
    let term = params.search.unwrap_or_default();
    let matches: Vec<_> = search_programs(&programs, &term).into_iter().cloned().collect();
    Json(matches)
}

async fn create_program<S: Store + 'static>(
    State(service): SharedCatalog<S>,
    JsonBody(draft): JsonBody<ProgramDraft>,
) -> Result<impl IntoResponse, WorkflowError> {
    let program = service.create_program(draft)?;
    Ok((StatusCode::CREATED, Json(program)))
}

async fn get_program<S: Store + 'static>(
    State(service): SharedCatalog<S>,
    Path(program_id): Path<String>,
) -> Result<impl IntoResponse, WorkflowError> {
    service
        .program(&program_id)
        .map(Json)
        .ok_or_else(|| WorkflowError::missing("program", &program_id))
}

async fn update_program<S: Store + 'static>(
    State(service): SharedCatalog<S>,
    Path(program_id): Path<String>,
    JsonBody(draft): JsonBody<ProgramDraft>,
) -> Result<impl IntoResponse, WorkflowError> {
    Ok(Json(service.update_program(&program_id, draft)?))
}

async fn delete_program<S: Store + 'static>(
    State(service): SharedCatalog<S>,
    Path(program_id): Path<String>,
) -> Result<StatusCode, WorkflowError> {
    service.delete_program(&program_id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn program_timeline<S: Store + 'static>(
    State(service): SharedCatalog<S>,
    Path(program_id): Path<String>,
) -> impl IntoResponse {
    Json(service.timeline(&program_id))
}

async fn link_course<S: Store + 'static>(
    State(service): SharedCatalog<S>,
    Path(program_id): Path<String>,
    JsonBody(placement): JsonBody<Placement>,
) -> Result<impl IntoResponse, WorkflowError> {
    let link = service.link_course(&program_id, placement)?;
    Ok((StatusCode::CREATED, Json(link)))
}

async fn unlink_course<S: Store + 'static>(
    State(service): SharedCatalog<S>,
    Path(link_id): Path<String>,
) -> Result<StatusCode, WorkflowError> {
    service.unlink_course(&link_id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_courses<S: Store + 'static>(
    State(service): SharedCatalog<S>,
    Query(params): Query<CourseSearch>,
) -> impl IntoResponse {
    let courses = service.list_courses();
    let term = params.search.unwrap_or_default();
    let matches: Vec<_> = search_courses(&courses, &term, params.category)
        .into_iter()
        .cloned()
        .collect();
    Json(matches)
}

async fn create_course<S: Store + 'static>(
    State(service): SharedCatalog<S>,
    JsonBody(draft): JsonBody<CourseDraft>,
) -> Result<impl IntoResponse, WorkflowError> {
    let course = service.create_course(draft)?;
    Ok((StatusCode::CREATED, Json(course)))
}

async fn get_course<S: Store + 'static>(
    State(service): SharedCatalog<S>,
    Path(course_id): Path<String>,
) -> Result<impl IntoResponse, WorkflowError> {
    service
        .course(&course_id)
        .map(Json)
        .ok_or_else(|| WorkflowError::missing("course", &course_id))
}

async fn update_course<S: Store + 'static>(
    State(service): SharedCatalog<S>,
    Path(course_id): Path<String>,
    JsonBody(draft): JsonBody<CourseDraft>,
) -> Result<impl IntoResponse, WorkflowError> {
    Ok(Json(service.update_course(&course_id, draft)?))
}

async fn delete_course<S: Store + 'static>(
    State(service): SharedCatalog<S>,
    Path(course_id): Path<String>,
) -> Result<StatusCode, WorkflowError> {
    service.delete_course(&course_id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn overview<S: Store + 'static>(State(service): SharedCatalog<S>) -> impl IntoResponse {
    Json(service.overview())
}
