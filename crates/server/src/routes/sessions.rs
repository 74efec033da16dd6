use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use shared::{SessionDetail, SessionSummary};

use crate::{auth::CurrentUser, error::AppError, history, state::AppState};

/// GET /api/sessions, newest first.
pub async fn list_sessions(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<SessionSummary>>, AppError> {
    let sessions = state.db.list_coach_sessions(&current.user.id).await?;
    Ok(Json(sessions.iter().map(history::summary).collect()))
}

/// GET /api/sessions/:id
pub async fn get_session(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<SessionDetail>, AppError> {
    let session = state
        .db
        .get_coach_session(&id, &current.user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Session not found".to_string()))?;
    Ok(Json(history::detail(session)))
}

/// DELETE /api/sessions/:id
pub async fn delete_session(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    if !state.db.delete_coach_session(&id, &current.user.id).await? {
        return Err(AppError::NotFound("Session not found".to_string()));
    }
    tracing::info!("Deleted session {}", id);
    Ok(Json(json!({ "success": true })))
}
