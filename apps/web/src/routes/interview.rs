use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::auth::BearerToken;
use crate::errors::AppError;
use crate::gateway::InterviewKind;
use crate::state::AppState;

/// POST /api/interview/:kind  (questions | answer-tips | simulate)
pub async fn handle_interview(
    State(state): State<AppState>,
    token: BearerToken,
    Path(kind): Path<String>,
    Json(request): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let kind: InterviewKind = serde_json::from_value(Value::String(kind.clone()))
        .map_err(|_| AppError::NotFound(format!("Unknown interview tool '{kind}'")))?;
    let answer = state
        .backend
        .interview(token.as_deref(), kind, request)
        .await?;
    Ok(Json(answer))
}
