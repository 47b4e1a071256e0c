use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::store::{Query, Record, RecordId, Store, StoreError};
use crate::workflows::error::{required_text, WorkflowError};

/// Portal role resolved from `user_roles`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortalRole {
    #[default]
    Student,
    Faculty,
    Admin,
}

impl PortalRole {
    pub const fn label(self) -> &'static str {
        match self {
            PortalRole::Student => "student",
            PortalRole::Faculty => "faculty",
            PortalRole::Admin => "admin",
        }
    }

    /// Faculty and administrators see the admin console.
    pub const fn is_staff(self) -> bool {
        matches!(self, PortalRole::Faculty | PortalRole::Admin)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub id: RecordId,
    pub user_id: String,
    pub role: PortalRole,
    pub created_at: DateTime<Utc>,
}

impl Record for RoleAssignment {
    const TABLE: &'static str = "user_roles";

    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// Reads and writes role assignments.
pub struct RoleDirectory<S> {
    store: Arc<S>,
}

impl<S> RoleDirectory<S>
where
    S: Store + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Users without an assignment are students; lookups that fail also fall back to student.
    pub fn role_for(&self, user_id: &str) -> PortalRole {
        match self.assignment(user_id) {
            Ok(Some(assignment)) => assignment.role,
            Ok(None) => PortalRole::default(),
            Err(err) => {
                warn!(error = %err, user_id, "role lookup failed, defaulting to student");
                PortalRole::default()
            }
        }
    }

    /// Replaces any existing assignment for the user.
    pub fn assign(&self, user_id: &str, role: PortalRole) -> Result<RoleAssignment, WorkflowError> {
        let user_id = required_text("user_id", user_id)?;

        let assignment = match self.assignment(&user_id)? {
            Some(existing) => self
                .store
                .update(&existing.id, |row: &mut RoleAssignment| row.role = role)?,
            None => self.store.insert(RoleAssignment {
                id: RecordId::generate(),
                user_id: user_id.clone(),
                role,
                created_at: Utc::now(),
            })?,
        };

        info!(user_id = %assignment.user_id, role = role.label(), "role assigned");
        Ok(assignment)
    }

    fn assignment(&self, user_id: &str) -> Result<Option<RoleAssignment>, StoreError> {
        let rows: Vec<RoleAssignment> = self
            .store
            .select(&Query::new().eq("user_id", user_id.trim()))?;
        Ok(rows.into_iter().next())
    }
}
