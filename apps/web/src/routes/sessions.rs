use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::bindings::{BulletKey, SectionKey};
use crate::edit::EditCommand;
use crate::errors::AppError;
use crate::models::resume::ResumeDocument;
use crate::session::SessionSnapshot;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct DraftRequest {
    pub item: usize,
    pub bullet: usize,
    pub text: String,
}

#[derive(Deserialize)]
pub struct ResetRequest {
    #[serde(default)]
    pub document: Option<ResumeDocument>,
}

/// POST /api/sessions
pub async fn handle_create(
    State(state): State<AppState>,
    Json(document): Json<ResumeDocument>,
) -> (StatusCode, Json<SessionSnapshot>) {
    let snapshot = state.sessions.create(document).await;
    (StatusCode::CREATED, Json(snapshot))
}

/// GET /api/sessions/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(state.sessions.snapshot(id).await?))
}

/// PATCH /api/sessions/:id
pub async fn handle_apply(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(command): Json<EditCommand>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(state.sessions.apply(id, command).await?))
}

/// PUT /api/sessions/:id/drafts
pub async fn handle_stage_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<DraftRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let key = BulletKey::new(req.item, req.bullet);
    Ok(Json(state.sessions.stage_draft(id, key, req.text).await?))
}

/// POST /api/sessions/:id/flush
pub async fn handle_flush(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(state.sessions.flush(id).await?))
}

/// POST /api/sessions/:id/edit-mode
pub async fn handle_toggle_edit_mode(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(key): Json<SectionKey>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(state.sessions.toggle_edit_mode(id, key).await?))
}

/// POST /api/sessions/:id/reset
/// An empty body restores the document the session started from.
pub async fn handle_reset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    req: Option<Json<ResetRequest>>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let document = req.and_then(|Json(req)| req.document);
    Ok(Json(state.sessions.reset(id, document).await?))
}

/// DELETE /api/sessions/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Edit session {id} not found")))
    }
}
