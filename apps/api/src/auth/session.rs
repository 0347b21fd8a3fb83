use axum::Json;
use axum::http::StatusCode;
use chapter_core::{AppError, SessionState, UserIdentity};
use tower_sessions::Session;
use tracing::info;

use crate::dto::SessionStateResponse;
use crate::error::ApiResult;

use super::SESSION_USER_KEY;

/// Settles the session bootstrap for the current cookie.
pub async fn session_state(session: &Session) -> ApiResult<SessionState> {
    let pending = SessionState::default().begin();
    let identity = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?;

    Ok(pending.resolve(identity))
}

pub async fn logout_handler(session: Session) -> ApiResult<StatusCode> {
    let state = session_state(&session).await?;

    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    if let Some(identity) = state.identity() {
        info!(user_id = %identity.user_id(), "session closed");
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn me_handler(session: Session) -> ApiResult<Json<SessionStateResponse>> {
    let state = session_state(&session).await?;
    Ok(Json(SessionStateResponse::from(state)))
}
