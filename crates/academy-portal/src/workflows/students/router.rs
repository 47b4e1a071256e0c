use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, put},
    Json, Router,
};
use serde::Deserialize;

use super::domain::{Enrollment, RosterFilter, StudentStatus, TaskDraft};
use super::service::StudentService;
use crate::access::MaybeActor;
use crate::store::{RecordId, Store};
use crate::workflows::error::{JsonBody, WorkflowError};

type SharedStudents<S> = State<Arc<StudentService<S>>>;

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: StudentStatus,
}

#[derive(Debug, Deserialize)]
pub struct ProgressReport {
    pub progress: u8,
}

#[derive(Debug, Deserialize)]
pub struct TaskCompletionChange {
    pub completed: bool,
}

#[derive(Debug, Deserialize)]
pub struct Term {
    pub semester: u8,
    pub year: u8,
}

pub fn student_router<S: Store + 'static>(service: Arc<StudentService<S>>) -> Router {
    Router::new()
        .route("/api/v1/students", get(roster::<S>).post(enroll::<S>))
        .route("/api/v1/students/stats", get(roster_stats::<S>))
        .route("/api/v1/students/me", get(current_student::<S>))
        .route("/api/v1/students/:student_id", get(student::<S>))
        .route(
            "/api/v1/students/:student_id/status",
            put(set_status::<S>),
        )
        .route(
            "/api/v1/students/:student_id/progress/:course_id",
            put(record_progress::<S>),
        )
        .route(
            "/api/v1/students/:student_id/tasks",
            get(tasks::<S>).post(add_task::<S>),
        )
        .route("/api/v1/tasks/:task_id", patch(complete_task::<S>))
        .route(
            "/api/v1/students/:student_id/dashboard",
            get(dashboard::<S>),
        )
        .with_state(service)
}

async fn roster<S: Store + 'static>(
    State(service): SharedStudents<S>,
    Query(filter): Query<RosterFilter>,
) -> impl IntoResponse {
    Json(service.roster(&filter))
}

async fn roster_stats<S: Store + 'static>(State(service): SharedStudents<S>) -> impl IntoResponse {
    Json(service.roster_stats())
}

async fn enroll<S: Store + 'static>(
    State(service): SharedStudents<S>,
    JsonBody(enrollment): JsonBody<Enrollment>,
) -> Result<impl IntoResponse, WorkflowError> {
    let student = service.enroll(enrollment)?;
    Ok((StatusCode::CREATED, Json(student)))
}

async fn current_student<S: Store + 'static>(
    State(service): SharedStudents<S>,
    MaybeActor(actor): MaybeActor,
) -> Result<impl IntoResponse, WorkflowError> {
    let actor = actor.ok_or(WorkflowError::Unauthorized("view a student profile"))?;
    service
        .student_for_actor(&actor)
        .map(Json)
        .ok_or_else(|| WorkflowError::missing("student", actor.user_id()))
}

async fn student<S: Store + 'static>(
    State(service): SharedStudents<S>,
    Path(student_id): Path<String>,
) -> Result<impl IntoResponse, WorkflowError> {
    service
        .student(&student_id)
        .map(Json)
        .ok_or_else(|| WorkflowError::missing("student", &student_id))
}

async fn set_status<S: Store + 'static>(
    State(service): SharedStudents<S>,
    Path(student_id): Path<String>,
    JsonBody(change): JsonBody<StatusChange>,
) -> Result<impl IntoResponse, WorkflowError> {
    Ok(Json(service.set_status(&student_id, change.status)?))
}

async fn record_progress<S: Store + 'static>(
    State(service): SharedStudents<S>,
    Path((student_id, course_id)): Path<(String, String)>,
    JsonBody(report): JsonBody<ProgressReport>,
) -> Result<impl IntoResponse, WorkflowError> {
    Ok(Json(service.record_progress(
        &student_id,
        &course_id,
        report.progress,
    )?))
}

async fn tasks<S: Store + 'static>(
    State(service): SharedStudents<S>,
    Path(student_id): Path<String>,
) -> impl IntoResponse {
    let tasks = RecordId::parse(&student_id)
        .map(|id| service.tasks_for(&id))
        .unwrap_or_default();
    Json(tasks)
}

async fn add_task<S: Store + 'static>(
    State(service): SharedStudents<S>,
    Path(student_id): Path<String>,
    JsonBody(draft): JsonBody<TaskDraft>,
) -> Result<impl IntoResponse, WorkflowError> {
    let task = service.add_task(&student_id, draft)?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn complete_task<S: Store + 'static>(
    State(service): SharedStudents<S>,
    Path(task_id): Path<String>,
    JsonBody(change): JsonBody<TaskCompletionChange>,
) -> Result<impl IntoResponse, WorkflowError> {
    Ok(Json(service.set_task_completed(&task_id, change.completed)?))
}

async fn dashboard<S: Store + 'static>(
    State(service): SharedStudents<S>,
    Path(student_id): Path<String>,
    Query(term): Query<Term>,
) -> Result<impl IntoResponse, WorkflowError> {
    Ok(Json(service.dashboard(&student_id, term.semester, term.year)?))
}
