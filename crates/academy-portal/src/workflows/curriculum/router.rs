use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};

use super::documents::{CurriculumLibrary, DocumentFilter, DocumentUpload};
use crate::access::MaybeActor;
use crate::store::Store;
use crate::workflows::error::{JsonBody, WorkflowError};

pub fn curriculum_router<S: Store + 'static>(library: Arc<CurriculumLibrary<S>>) -> Router {
    Router::new()
        .route(
            "/api/v1/curriculum",
            get(list_documents::<S>).post(upload_document::<S>),
        )
        .route(
            "/api/v1/curriculum/:document_id",
            delete(delete_document::<S>),
        )
        .with_state(library)
}

async fn list_documents<S: Store + 'static>(
    State(library): State<Arc<CurriculumLibrary<S>>>,
    Query(filter): Query<DocumentFilter>,
) -> impl IntoResponse {
    Json(library.list(&filter))
}

async fn upload_document<S: Store + 'static>(
    State(library): State<Arc<CurriculumLibrary<S>>>,
    MaybeActor(actor): MaybeActor,
    JsonBody(upload): JsonBody<DocumentUpload>,
) -> Result<impl IntoResponse, WorkflowError> {
    let document = library.upload(upload, actor.as_ref())?;
    Ok((StatusCode::CREATED, Json(document)))
}

async fn delete_document<S: Store + 'static>(
    State(library): State<Arc<CurriculumLibrary<S>>>,
    Path(document_id): Path<String>,
) -> Result<StatusCode, WorkflowError> {
    library.delete(&document_id)?;
    Ok(StatusCode::NO_CONTENT)
}
