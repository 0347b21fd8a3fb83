use std::sync::Arc;

use chapter_core::{AppError, AppResult, UserIdentity};
use chapter_domain::{Permission, ScopeContext, ScopeRef};

use crate::{AuditRepository, AuthorizationService, RoleAssignmentRepository, ScopeDirectory};

mod assignments;
mod catalog;


pub use catalog::CatalogRole;

/// Application service for role administration workflows.
#[derive(Clone)]
pub struct RoleAdminService {
    authorization_service: AuthorizationService,
    scope_directory: Arc<dyn ScopeDirectory>,
    repository: Arc<dyn RoleAssignmentRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl RoleAdminService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        scope_directory: Arc<dyn ScopeDirectory>,
        repository: Arc<dyn RoleAssignmentRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            authorization_service,
            scope_directory,
            repository,
            audit_repository,
        }
    }

    async fn require_users_view_permission(&self, actor: &UserIdentity) -> AppResult<()> {
        self.authorization_service
            .ensure(
                actor.user_id(),
                Permission::UsersView,
                ScopeContext::instance(),
            )
            .await
    }

    /// Instance roles need the instance role permission; chapter and event
    /// roles need the chapter role permission on the target's chain.
    async fn require_role_change_permission(
        &self,
        actor: &UserIdentity,
        scope: ScopeRef,
    ) -> AppResult<()> {
        let (permission, context) = match scope {
            ScopeRef::Instance => (Permission::UserInstanceRoleChange, ScopeContext::instance()),
            ScopeRef::Chapter(chapter_id) => (
                Permission::ChapterUserRoleChange,
                ScopeContext::chapter(chapter_id),
            ),
            ScopeRef::Event(event_id) => (
                Permission::ChapterUserRoleChange,
                ScopeContext::event(event_id),
            ),
        };

        self.authorization_service
            .ensure(actor.user_id(), permission, context)
            .await
    }

    async fn require_existing_scope(&self, scope: ScopeRef) -> AppResult<()> {
        if self.scope_directory.scope_exists(scope).await? {
            return Ok(());
        }

        Err(AppError::NotFound(format!("scope '{scope}' was not found")))
    }
}
