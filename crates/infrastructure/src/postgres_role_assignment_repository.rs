use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use chapter_application::{
    MembershipRepository, RoleAssignment, RoleAssignmentInput, RoleAssignmentRepository,
};
use chapter_core::{AppError, AppResult, UserId};
use chapter_domain::{RoleName, ScopeMemberships, ScopeRef, ScopeTier};

mod assignments;
mod memberships;


/// PostgreSQL-backed repository for scoped role assignments.
///
/// Serves both the membership reads used by authorization checks and the
/// writes used by role administration.
#[derive(Clone)]
pub struct PostgresRoleAssignmentRepository {
    pool: PgPool,
}

impl PostgresRoleAssignmentRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ScopedRoleRow {
    tier: String,
    chapter_id: Option<uuid::Uuid>,
    event_id: Option<uuid::Uuid>,
    role_name: String,
}

#[derive(Debug, FromRow)]
struct RoleAssignmentRow {
    user_id: uuid::Uuid,
    tier: String,
    chapter_id: Option<uuid::Uuid>,
    event_id: Option<uuid::Uuid>,
    role_name: String,
    assigned_at: String,
}

#[derive(Debug, FromRow)]
struct AssignedRoleRow {
    tier: String,
    role_name: String,
}

#[async_trait]
impl MembershipRepository for PostgresRoleAssignmentRepository {
    async fn memberships_of(
        &self,
        user_id: UserId,
        scopes: &[ScopeRef],
    ) -> AppResult<ScopeMemberships> {
        self.memberships_of_impl(user_id, scopes).await
    }
}

#[async_trait]
impl RoleAssignmentRepository for PostgresRoleAssignmentRepository {
    async fn assign_role(&self, input: &RoleAssignmentInput) -> AppResult<bool> {
        self.assign_role_impl(input).await
    }

    async fn remove_role(&self, input: &RoleAssignmentInput) -> AppResult<()> {
        self.remove_role_impl(input).await
    }

    async fn list_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleAssignment>> {
        self.list_roles_for_user_impl(user_id).await
    }

    async fn list_assigned_roles(&self) -> AppResult<Vec<(ScopeTier, RoleName)>> {
        self.list_assigned_roles_impl().await
    }
}

fn decode_tier(value: &str) -> AppResult<ScopeTier> {
    ScopeTier::from_str(value)
        .map_err(|error| AppError::Internal(format!("invalid stored scope tier: {error}")))
}

fn decode_role_name(value: &str) -> AppResult<RoleName> {
    RoleName::new(value)
        .map_err(|error| AppError::Internal(format!("invalid stored role name: {error}")))
}

fn decode_scope(
    tier: &str,
    chapter_id: Option<uuid::Uuid>,
    event_id: Option<uuid::Uuid>,
) -> AppResult<ScopeRef> {
    let tier = decode_tier(tier)?;
    ScopeRef::from_parts(tier, chapter_id.or(event_id))
        .map_err(|error| AppError::Internal(format!("invalid stored scope: {error}")))
}

/// Splits a scope into the `(tier, chapter_id, event_id)` column triple.
fn scope_columns(scope: ScopeRef) -> (&'static str, Option<uuid::Uuid>, Option<uuid::Uuid>) {
    match scope {
        ScopeRef::Instance => (ScopeTier::Instance.as_str(), None, None),
        ScopeRef::Chapter(chapter_id) => {
            (ScopeTier::Chapter.as_str(), Some(chapter_id.as_uuid()), None)
        }
        ScopeRef::Event(event_id) => (ScopeTier::Event.as_str(), None, Some(event_id.as_uuid())),
    }
}
