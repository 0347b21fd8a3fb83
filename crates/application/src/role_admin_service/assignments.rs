use chapter_core::{UserId, UserIdentity};
use chapter_domain::{AuditAction, RoleName};
use tracing::{error, info, warn};

use crate::{AuditEvent, RoleAssignment, RoleAssignmentInput};

use super::*;

const BOOTSTRAP_ADMIN_ROLE: &str = "administrator";

impl RoleAdminService {
    /// Lists role assignments held by one user.
    pub async fn list_user_roles(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
    ) -> AppResult<Vec<RoleAssignment>> {
        self.require_users_view_permission(actor).await?;
        self.repository.list_roles_for_user(user_id).await
    }

    /// Grants a catalog role at a scope and emits an audit event.
    pub async fn grant_role(
        &self,
        actor: &UserIdentity,
        input: RoleAssignmentInput,
    ) -> AppResult<()> {
        self.require_catalog_role(&input)?;
        self.require_role_change_permission(actor, input.scope)
            .await?;
        self.require_existing_scope(input.scope).await?;

        let created = self.repository.assign_role(&input).await?;
        if !created {
            return Ok(());
        }

        info!(
            actor = %actor.user_id(),
            user_id = %input.user_id,
            scope = %input.scope,
            role = %input.role_name,
            "role granted"
        );

        self.audit_granted(
            &input,
            AuditEvent {
                actor: Some(actor.user_id()),
                action: AuditAction::SecurityRoleAssigned,
                resource_type: "role_assignment".to_owned(),
                resource_id: assignment_resource_id(&input),
                detail: Some(format!(
                    "assigned {} role '{}' to '{}'",
                    input.scope.tier(),
                    input.role_name,
                    input.user_id
                )),
            },
        )
        .await
    }

    /// Revokes a role assignment and emits an audit event.
    pub async fn revoke_role(
        &self,
        actor: &UserIdentity,
        input: RoleAssignmentInput,
    ) -> AppResult<()> {
        self.require_catalog_role(&input)?;
        self.require_role_change_permission(actor, input.scope)
            .await?;

        self.repository.remove_role(&input).await?;

        info!(
            actor = %actor.user_id(),
            user_id = %input.user_id,
            scope = %input.scope,
            role = %input.role_name,
            "role revoked"
        );

        let event = AuditEvent {
            actor: Some(actor.user_id()),
            action: AuditAction::SecurityRoleUnassigned,
            resource_type: "role_assignment".to_owned(),
            resource_id: assignment_resource_id(&input),
            detail: Some(format!(
                "removed {} role '{}' from '{}'",
                input.scope.tier(),
                input.role_name,
                input.user_id
            )),
        };

        if let Err(audit_error) = self.audit_repository.append_event(event).await {
            warn!(
                error = %audit_error,
                resource_id = %assignment_resource_id(&input),
                "audit append failed, restoring revoked role"
            );
            if let Err(restore_error) = self.repository.assign_role(&input).await {
                error!(
                    error = %restore_error,
                    resource_id = %assignment_resource_id(&input),
                    "failed to restore revoked role"
                );
            }
            return Err(audit_error);
        }

        Ok(())
    }

    /// Seeds the instance administrator role for `user_id`.
    ///
    /// Only called by the composition root at startup, so no actor check runs.
    pub async fn bootstrap_instance_admin(&self, user_id: UserId) -> AppResult<()> {
        let input = RoleAssignmentInput {
            user_id,
            scope: ScopeRef::Instance,
            role_name: RoleName::new(BOOTSTRAP_ADMIN_ROLE)?,
        };
        self.require_catalog_role(&input)?;

        if !self.repository.assign_role(&input).await? {
            return Ok(());
        }

        info!(%user_id, "bootstrap instance administrator seeded");

        self.audit_granted(
            &input,
            AuditEvent {
                actor: None,
                action: AuditAction::SecurityBootstrapAdminSeeded,
                resource_type: "role_assignment".to_owned(),
                resource_id: assignment_resource_id(&input),
                detail: Some(format!("seeded instance administrator '{user_id}'")),
            },
        )
        .await
    }

    /// Appends the audit event for a fresh assignment, removing the
    /// assignment again when the event cannot be stored.
    ///
    /// A retried grant then finds no row and is audited on that attempt.
    async fn audit_granted(
        &self,
        input: &RoleAssignmentInput,
        event: AuditEvent,
    ) -> AppResult<()> {
        let Err(audit_error) = self.audit_repository.append_event(event).await else {
            return Ok(());
        };

        warn!(
            error = %audit_error,
            resource_id = %assignment_resource_id(input),
            "audit append failed, rolling back role grant"
        );
        if let Err(rollback_error) = self.repository.remove_role(input).await {
            error!(
                error = %rollback_error,
                resource_id = %assignment_resource_id(input),
                "failed to roll back unaudited role grant"
            );
        }

        Err(audit_error)
    }

    fn require_catalog_role(&self, input: &RoleAssignmentInput) -> AppResult<()> {
        let tier = input.scope.tier();
        if self
            .authorization_service
            .catalog()
            .contains(&input.role_name, tier)
        {
            return Ok(());
        }

        Err(AppError::Validation(format!(
            "{tier} role '{}' is not defined in the role catalog",
            input.role_name
        )))
    }
}

fn assignment_resource_id(input: &RoleAssignmentInput) -> String {
    format!("{}:{}:{}", input.user_id, input.scope, input.role_name)
}
