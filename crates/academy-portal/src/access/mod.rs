//! Actor identity and role lookup.
//!
//! Sign-in happens upstream; requests reach the portal with the resolved user id in the
//! [`ACTOR_HEADER`] header. This module turns that header into an [`Actor`] and keeps the
//! `user_roles` table used to tell administrators, faculty and students apart.

mod roles;
pub mod router;

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};

pub use roles::{PortalRole, RoleAssignment, RoleDirectory};
pub use router::role_router;

/// Header carrying the authenticated user id.
pub const ACTOR_HEADER: &str = "x-portal-user";

/// The authenticated principal performing an operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Actor(String);

impl Actor {
    pub fn new(user_id: &str) -> Option<Self> {
        let trimmed = user_id.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    pub fn user_id(&self) -> &str {
        &self.0
    }
}

/// Extractor yielding the request's actor, if the upstream identity layer resolved one.
#[derive(Debug, Clone, Default)]
pub struct MaybeActor(pub Option<Actor>);

#[axum::async_trait]
impl<S> FromRequestParts<S> for MaybeActor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(Actor::new);
        Ok(Self(actor))
    }
}
