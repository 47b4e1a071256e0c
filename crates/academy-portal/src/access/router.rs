use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::{MaybeActor, PortalRole, RoleDirectory};
use crate::store::Store;
use crate::workflows::error::JsonBody;

#[derive(Debug, Deserialize)]
pub(crate) struct AssignRoleRequest {
    pub(crate) role: PortalRole,
}

pub fn role_router<S>(directory: Arc<RoleDirectory<S>>) -> Router
where
    S: Store + 'static,
{
    Router::new()
        .route("/api/v1/roles/me", get(current_role_handler::<S>))
        .route("/api/v1/roles/:user_id", put(assign_role_handler::<S>))
        .with_state(directory)
}

pub(crate) async fn current_role_handler<S>(
    State(directory): State<Arc<RoleDirectory<S>>>,
    MaybeActor(actor): MaybeActor,
) -> Response
where
    S: Store + 'static,
{
    match actor {
        Some(actor) => {
            let role = directory.role_for(actor.user_id());
            let payload = json!({
                "user_id": actor.user_id(),
                "role": role.label(),
                "staff": role.is_staff(),
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        None => {
            let payload = json!({ "error": "no signed-in user on this request" });
            (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn assign_role_handler<S>(
    State(directory): State<Arc<RoleDirectory<S>>>,
    Path(user_id): Path<String>,
    JsonBody(request): JsonBody<AssignRoleRequest>,
) -> Response
where
    S: Store + 'static,
{
    match directory.assign(&user_id, request.role) {
        Ok(assignment) => (StatusCode::OK, Json(assignment)).into_response(),
        Err(err) => err.into_response(),
    }
}
