use std::collections::BTreeSet;

use chapter_domain::{Decision, Permission, ScopeContext, effective_permissions, evaluate};
use tracing::{debug, error, info};

use super::*;

impl AuthorizationService {
    /// Ensures a user holds `permission` within `context`.
    ///
    /// Fails with `Forbidden` on deny, `InvalidContext` for unresolvable
    /// scopes and `LookupTimeout` when storage does not answer in time.
    pub async fn ensure(
        &self,
        user_id: UserId,
        permission: Permission,
        context: ScopeContext,
    ) -> AppResult<()> {
        self.ensure_before(user_id, permission, context, self.default_deadline())
            .await
    }

    /// Same as `ensure`, bounded by a caller-supplied deadline.
    pub async fn ensure_before(
        &self,
        user_id: UserId,
        permission: Permission,
        context: ScopeContext,
        deadline: Instant,
    ) -> AppResult<()> {
        match self.decide(user_id, permission, context, deadline).await? {
            Decision::Allow => Ok(()),
            Decision::Deny => Err(AppError::Forbidden(format!(
                "user '{user_id}' is missing permission '{permission}' in scope '{context}'"
            ))),
        }
    }

    /// Returns whether the user currently holds the permission.
    pub async fn has_permission(
        &self,
        user_id: UserId,
        permission: Permission,
        context: ScopeContext,
    ) -> AppResult<bool> {
        Ok(self
            .decide(user_id, permission, context, self.default_deadline())
            .await?
            .is_allowed())
    }

    /// Answers several permission questions for one context with a single
    /// lookup, preserving the request order.
    pub async fn check_permissions(
        &self,
        user_id: UserId,
        permissions: &[Permission],
        context: ScopeContext,
    ) -> AppResult<Vec<(Permission, bool)>> {
        let deadline = self.default_deadline();
        let scopes = self.resolve_scopes_before(context, deadline).await?;
        let memberships = self.lookup_memberships(user_id, &scopes, deadline).await?;
        let effective: BTreeSet<Permission> =
            effective_permissions(self.catalog(), &scopes, &memberships).inspect_err(|err| {
                error!(%user_id, %context, error = %err, "role catalog does not cover stored assignment");
            })?;

        Ok(permissions
            .iter()
            .map(|permission| {
                let decision = if effective.contains(permission) {
                    Decision::Allow
                } else {
                    Decision::Deny
                };
                log_decision(user_id, *permission, context, decision);
                (*permission, decision.is_allowed())
            })
            .collect())
    }

    async fn decide(
        &self,
        user_id: UserId,
        permission: Permission,
        context: ScopeContext,
        deadline: Instant,
    ) -> AppResult<Decision> {
        let scopes = self.resolve_scopes_before(context, deadline).await?;
        let memberships = self.lookup_memberships(user_id, &scopes, deadline).await?;

        let decision = evaluate(self.catalog(), permission, &scopes, &memberships).inspect_err(
            |err| {
                error!(%user_id, %permission, %context, error = %err, "role catalog does not cover stored assignment");
            },
        )?;

        log_decision(user_id, permission, context, decision);
        Ok(decision)
    }
}

fn log_decision(
    user_id: UserId,
    permission: Permission,
    context: ScopeContext,
    decision: Decision,
) {
    match decision {
        Decision::Allow => debug!(%user_id, %permission, %context, "permission granted"),
        Decision::Deny => info!(%user_id, %permission, %context, "permission denied"),
    }
}
