use async_trait::async_trait;
use chapter_core::{AppResult, UserId};
use chapter_domain::{ChapterId, EventId, RoleName, ScopeMemberships, ScopeRef, ScopeTier};

/// Port for resolving the chapter/event hierarchy.
#[async_trait]
pub trait ScopeDirectory: Send + Sync {
    /// Returns the chapter owning `event_id`, or `None` when the event is unknown.
    async fn parent_chapter_of(&self, event_id: EventId) -> AppResult<Option<ChapterId>>;

    /// Returns whether the chapter or event behind `scope` exists.
    async fn scope_exists(&self, scope: ScopeRef) -> AppResult<bool>;
}

/// Read port for role memberships used by authorization checks.
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Returns the roles `user_id` holds at each of `scopes`.
    ///
    /// Implementations answer from a single consistent read. Scopes without
    /// roles may be omitted or mapped to an empty set.
    async fn memberships_of(
        &self,
        user_id: UserId,
        scopes: &[ScopeRef],
    ) -> AppResult<ScopeMemberships>;
}

/// One persisted role assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignment {
    /// Assigned user.
    pub user_id: UserId,
    /// Scope the role is held at.
    pub scope: ScopeRef,
    /// Role name within the scope tier.
    pub role_name: RoleName,
    /// Assignment timestamp in RFC3339.
    pub assigned_at: String,
}

/// Input payload identifying one role assignment to grant or revoke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignmentInput {
    /// Target user.
    pub user_id: UserId,
    /// Scope of the assignment.
    pub scope: ScopeRef,
    /// Role name within the scope tier.
    pub role_name: RoleName,
}

/// Write port for administering role assignments.
#[async_trait]
pub trait RoleAssignmentRepository: Send + Sync {
    /// Stores an assignment. Returns `false` when it already existed.
    async fn assign_role(&self, input: &RoleAssignmentInput) -> AppResult<bool>;

    /// Deletes an assignment, failing with `NotFound` when absent.
    async fn remove_role(&self, input: &RoleAssignmentInput) -> AppResult<()>;

    /// Lists every assignment held by one user.
    async fn list_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleAssignment>>;

    /// Lists the distinct `(tier, role)` pairs referenced by stored assignments.
    async fn list_assigned_roles(&self) -> AppResult<Vec<(ScopeTier, RoleName)>>;
}
