use axum::Json;
use axum::extract::{Extension, State};
use chapter_core::UserIdentity;

use crate::dto::{AuthorizationCheckRequest, AuthorizationCheckResponse};
use crate::error::ApiResult;
use crate::state::AppState;

#[cfg(test)]
mod tests;

/// Answers which of the requested permissions the caller holds in a context.
pub async fn check_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<AuthorizationCheckRequest>,
) -> ApiResult<Json<AuthorizationCheckResponse>> {
    let permissions = payload.permissions()?;
    let context = payload.context()?;

    let results = state
        .authorization_service
        .check_permissions(user.user_id(), &permissions, context)
        .await?;

    Ok(Json(AuthorizationCheckResponse::from(results)))
}
