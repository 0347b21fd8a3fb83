use chapter_core::{SessionState, UserIdentity};
use serde::Serialize;
use ts_rs::TS;

mod authorization;
mod security;

pub use authorization::{AuthorizationCheckRequest, AuthorizationCheckResponse};
pub use security::{CatalogRoleResponse, RoleAssignmentRequest, RoleAssignmentResponse};

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// API representation of the authenticated user.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-identity-response.ts"
)]
pub struct UserIdentityResponse {
    pub user_id: String,
    pub display_name: String,
    pub email: Option<String>,
}

/// Session bootstrap state reported to the frontend.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/session-state-response.ts"
)]
pub struct SessionStateResponse {
    pub state: String,
    pub user: Option<UserIdentityResponse>,
}

impl From<UserIdentity> for UserIdentityResponse {
    fn from(value: UserIdentity) -> Self {
        Self {
            user_id: value.user_id().to_string(),
            display_name: value.display_name().to_owned(),
            email: value.email().map(str::to_owned),
        }
    }
}

impl From<SessionState> for SessionStateResponse {
    fn from(value: SessionState) -> Self {
        let state = value.as_str().to_owned();
        let user = match value {
            SessionState::Authenticated(identity) => Some(UserIdentityResponse::from(identity)),
            _ => None,
        };

        Self { state, user }
    }
}
