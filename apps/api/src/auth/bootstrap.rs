use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chapter_core::{AppError, UserId, UserIdentity};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, warn};

use crate::error::ApiResult;
use crate::state::AppState;

use super::{SESSION_CREATED_AT_KEY, SESSION_USER_KEY};

#[derive(Debug, Deserialize)]
pub struct BootstrapRequest {
    pub user_id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub token: String,
}

pub async fn bootstrap_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<BootstrapRequest>,
) -> ApiResult<StatusCode> {
    if payload.token != state.bootstrap_token {
        warn!("bootstrap login rejected: invalid token");
        return Err(AppError::Unauthorized("invalid bootstrap token".to_owned()).into());
    }

    let user_id = UserId::parse(payload.user_id.as_str())?;
    let display_name = payload.display_name.trim();
    if display_name.is_empty() {
        return Err(AppError::Validation("display_name must not be empty".to_owned()).into());
    }
    let identity = UserIdentity::new(user_id, display_name, payload.email);

    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    session
        .insert(SESSION_USER_KEY, &identity)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session identity: {error}"))
        })?;

    session
        .insert(SESSION_CREATED_AT_KEY, chrono::Utc::now().timestamp())
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session creation time: {error}"))
        })?;

    info!(user_id = %user_id, "bootstrap login succeeded");
    Ok(StatusCode::NO_CONTENT)
}
