use std::str::FromStr;

use chapter_application::{CatalogRole, RoleAssignment, RoleAssignmentInput};
use chapter_core::{AppResult, UserId};
use chapter_domain::{RoleName, ScopeRef, ScopeTier};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::authorization::parse_id;

/// Incoming payload for granting or revoking a scoped role.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-assignment-request.ts"
)]
pub struct RoleAssignmentRequest {
    pub user_id: String,
    pub tier: String,
    pub scope_id: Option<String>,
    pub role_name: String,
}

/// API representation of a catalog role.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/catalog-role-response.ts"
)]
pub struct CatalogRoleResponse {
    pub tier: String,
    pub name: String,
    pub permissions: Vec<String>,
}

/// API representation of a role assignment.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-assignment-response.ts"
)]
pub struct RoleAssignmentResponse {
    pub user_id: String,
    pub tier: String,
    pub scope_id: Option<String>,
    pub role_name: String,
    pub assigned_at: String,
}

impl RoleAssignmentRequest {
    pub fn into_input(self) -> AppResult<RoleAssignmentInput> {
        let tier = ScopeTier::from_str(self.tier.trim())?;
        let scope_id = parse_id(self.scope_id.as_deref(), "scope_id")?;

        Ok(RoleAssignmentInput {
            user_id: UserId::parse(self.user_id.as_str())?,
            scope: ScopeRef::from_parts(tier, scope_id)?,
            role_name: RoleName::new(self.role_name)?,
        })
    }
}

impl From<CatalogRole> for CatalogRoleResponse {
    fn from(value: CatalogRole) -> Self {
        Self {
            tier: value.tier.as_str().to_owned(),
            name: value.name.as_str().to_owned(),
            permissions: value
                .permissions
                .into_iter()
                .map(|permission| permission.as_str().to_owned())
                .collect(),
        }
    }
}

impl From<RoleAssignment> for RoleAssignmentResponse {
    fn from(value: RoleAssignment) -> Self {
        let scope_id = match value.scope {
            ScopeRef::Instance => None,
            ScopeRef::Chapter(chapter_id) => Some(chapter_id.to_string()),
            ScopeRef::Event(event_id) => Some(event_id.to_string()),
        };

        Self {
            user_id: value.user_id.to_string(),
            tier: value.scope.tier().as_str().to_owned(),
            scope_id,
            role_name: value.role_name.as_str().to_owned(),
            assigned_at: value.assigned_at,
        }
    }
}
