use chapter_core::UserIdentity;
use chapter_domain::{RoleName, ScopeTier};
use tracing::{error, info};

use super::*;

/// Catalog role projection for administrative views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRole {
    /// Tier the role is defined for.
    pub tier: ScopeTier,
    /// Role name within the tier.
    pub name: RoleName,
    /// Granted permissions, sorted.
    pub permissions: Vec<Permission>,
}

impl RoleAdminService {
    /// Lists every catalog role.
    pub async fn list_catalog(&self, actor: &UserIdentity) -> AppResult<Vec<CatalogRole>> {
        self.require_users_view_permission(actor).await?;

        Ok(self
            .authorization_service
            .catalog()
            .entries()
            .map(|entry| CatalogRole {
                tier: entry.tier,
                name: entry.name.clone(),
                permissions: entry.permissions.iter().copied().collect(),
            })
            .collect())
    }

    /// Checks every stored assignment against the catalog.
    ///
    /// Run once at startup; an undefined role is a configuration error.
    pub async fn validate_persisted_assignments(&self) -> AppResult<()> {
        let assigned = self.repository.list_assigned_roles().await?;

        self.authorization_service
            .catalog()
            .validate_assignments(assigned.iter().map(|(tier, role)| (*tier, role)))
            .inspect_err(|err| error!(error = %err, "stored role assignments do not match the role catalog"))?;

        info!(
            assigned_roles = assigned.len(),
            "stored role assignments match the role catalog"
        );
        Ok(())
    }
}
