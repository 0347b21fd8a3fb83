use chapter_core::{AppError, AppResult};
use chapter_domain::{ChapterId, EventId, Permission, ScopeContext};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for a batch permission check.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/authorization-check-request.ts"
)]
pub struct AuthorizationCheckRequest {
    pub permissions: Vec<String>,
    pub chapter_id: Option<String>,
    pub event_id: Option<String>,
}

/// Outcome for one requested permission.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-check-response.ts"
)]
pub struct PermissionCheckResponse {
    pub permission: String,
    pub allowed: bool,
}

/// Batch permission check result, in request order.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/authorization-check-response.ts"
)]
pub struct AuthorizationCheckResponse {
    pub results: Vec<PermissionCheckResponse>,
}

impl AuthorizationCheckRequest {
    pub fn permissions(&self) -> AppResult<Vec<Permission>> {
        self.permissions
            .iter()
            .map(|value| Permission::from_transport(value.as_str()))
            .collect()
    }

    pub fn context(&self) -> AppResult<ScopeContext> {
        Ok(ScopeContext {
            chapter_id: parse_id(self.chapter_id.as_deref(), "chapter_id")?
                .map(ChapterId::from_uuid),
            event_id: parse_id(self.event_id.as_deref(), "event_id")?.map(EventId::from_uuid),
        })
    }
}

impl From<Vec<(Permission, bool)>> for AuthorizationCheckResponse {
    fn from(value: Vec<(Permission, bool)>) -> Self {
        Self {
            results: value
                .into_iter()
                .map(|(permission, allowed)| PermissionCheckResponse {
                    permission: permission.as_str().to_owned(),
                    allowed,
                })
                .collect(),
        }
    }
}

pub(super) fn parse_id(value: Option<&str>, field: &str) -> AppResult<Option<uuid::Uuid>> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| {
            uuid::Uuid::parse_str(value)
                .map_err(|error| AppError::Validation(format!("invalid {field} '{value}': {error}")))
        })
        .transpose()
}
