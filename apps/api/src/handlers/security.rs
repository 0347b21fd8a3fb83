use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use chapter_core::{UserId, UserIdentity};

use crate::dto::{CatalogRoleResponse, RoleAssignmentRequest, RoleAssignmentResponse};
use crate::error::ApiResult;
use crate::state::AppState;


pub async fn list_roles_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<CatalogRoleResponse>>> {
    let roles = state
        .role_admin_service
        .list_catalog(&user)
        .await?
        .into_iter()
        .map(CatalogRoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn list_user_roles_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<RoleAssignmentResponse>>> {
    let user_id = UserId::parse(user_id.as_str())?;
    let assignments = state
        .role_admin_service
        .list_user_roles(&user, user_id)
        .await?
        .into_iter()
        .map(RoleAssignmentResponse::from)
        .collect();

    Ok(Json(assignments))
}

pub async fn assign_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<RoleAssignmentRequest>,
) -> ApiResult<StatusCode> {
    state
        .role_admin_service
        .grant_role(&user, payload.into_input()?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn unassign_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<RoleAssignmentRequest>,
) -> ApiResult<StatusCode> {
    state
        .role_admin_service
        .revoke_role(&user, payload.into_input()?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
