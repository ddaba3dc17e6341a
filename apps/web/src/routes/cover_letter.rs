use axum::{
    extract::State,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::IntoResponse,
    Json,
};
use serde_json::Value;

use crate::auth::BearerToken;
use crate::errors::AppError;
use crate::models::backend::CoverLetter;
use crate::state::AppState;

/// POST /api/cover-letter/generate
/// The request body is passed to the backend unchanged.
pub async fn handle_generate(
    State(state): State<AppState>,
    token: BearerToken,
    Json(request): Json<Value>,
) -> Result<Json<CoverLetter>, AppError> {
    let letter = state
        .backend
        .generate_cover_letter(token.as_deref(), request)
        .await?;
    Ok(Json(letter))
}

/// POST /api/cover-letter/export
pub async fn handle_export(Json(letter): Json<CoverLetter>) -> Result<impl IntoResponse, AppError> {
    if letter.cover_letter.trim().is_empty() {
        return Err(AppError::Validation("cover_letter is empty".into()));
    }
    Ok((
        [
            (CONTENT_TYPE, "text/plain; charset=utf-8"),
            (CONTENT_DISPOSITION, "attachment; filename=\"cover_letter.txt\""),
        ],
        letter.cover_letter,
    ))
}
