use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::BearerToken;
use crate::errors::AppError;
use crate::gateway::{ResumeUpload, UploadedFile};
use crate::models::backend::ResumeSummary;
use crate::models::resume::ContactInfo;
use crate::models::score::{ScoreBranch, ScoreResult};
use crate::session::SessionSnapshot;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Option<String>,
}

#[derive(Serialize)]
pub struct ScoreResponse {
    pub data: ScoreResult,
    pub branch: ScoreBranch,
}

#[derive(Serialize)]
pub struct OptimizeResponse {
    #[serde(flatten)]
    pub session: SessionSnapshot,
    pub contact_details: Option<ContactInfo>,
}

#[derive(Serialize)]
pub struct ResumeListResponse {
    pub data: Vec<ResumeSummary>,
    pub cached: bool,
}

/// Reads the `file` | `resume_id` + `job_description` form the browser submits.
async fn read_upload(mut multipart: Multipart) -> Result<ResumeUpload, AppError> {
    let mut upload = ResumeUpload::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        match field.name().unwrap_or_default() {
            "file" => {
                let file_name = field.file_name().unwrap_or("resume").to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(e.to_string()))?;
                if !data.is_empty() {
                    upload.file = Some(UploadedFile {
                        file_name,
                        content_type,
                        data,
                    });
                }
            }
            "resume_id" => {
                let id = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(e.to_string()))?;
                upload.resume_id = Some(id.trim().to_string()).filter(|id| !id.is_empty());
            }
            "job_description" => {
                upload.job_description = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(e.to_string()))?;
            }
            _ => {}
        }
    }

    if upload.job_description.trim().is_empty() {
        return Err(AppError::Validation("job_description is required".into()));
    }
    if upload.file.is_none() && upload.resume_id.is_none() {
        return Err(AppError::Validation(
            "Either a resume file or a resume_id is required".into(),
        ));
    }
    Ok(upload)
}

/// POST /api/resume/score
pub async fn handle_score(
    State(state): State<AppState>,
    token: BearerToken,
    multipart: Multipart,
) -> Result<Json<ScoreResponse>, AppError> {
    let upload = read_upload(multipart).await?;
    let data = state.backend.score(token.as_deref(), upload).await?;
    let branch = data.branch();
    Ok(Json(ScoreResponse { data, branch }))
}

/// POST /api/resume/optimize
/// Opens an edit session on the optimized document.
pub async fn handle_optimize(
    State(state): State<AppState>,
    token: BearerToken,
    Query(query): Query<UserIdQuery>,
    multipart: Multipart,
) -> Result<Json<OptimizeResponse>, AppError> {
    let upload = read_upload(multipart).await?;
    let document = state.backend.optimize(token.as_deref(), upload).await?;
    if let Some(user_id) = query.user_id.as_deref() {
        state.resume_cache.invalidate_user(user_id);
    }

    let contact_details = document.contact_details.clone();
    let session = state.sessions.create(document).await;
    info!("Optimized resume opened in session {}", session.session_id);
    Ok(Json(OptimizeResponse {
        session,
        contact_details,
    }))
}

/// GET /api/resumes?user_id=
/// Anonymous calls always go to the backend and are never cached.
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    token: BearerToken,
    Query(query): Query<UserIdQuery>,
) -> Result<Json<ResumeListResponse>, AppError> {
    let user_id = query
        .user_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::Validation("user_id is required".into()))?;

    let Some(credential) = token.as_deref() else {
        let data = state.backend.list_resumes(None, &user_id).await?;
        return Ok(Json(ResumeListResponse {
            data,
            cached: false,
        }));
    };

    if let Some(data) = state.resume_cache.get(&user_id, credential) {
        return Ok(Json(ResumeListResponse { data, cached: true }));
    }
    let data = state.backend.list_resumes(Some(credential), &user_id).await?;
    state.resume_cache.put(&user_id, credential, data.clone());
    Ok(Json(ResumeListResponse {
        data,
        cached: false,
    }))
}

/// DELETE /api/resumes/cache?user_id=
/// Only drops entries the caller's own token fetched; without a user id, all of them.
pub async fn handle_invalidate_resumes(
    State(state): State<AppState>,
    token: BearerToken,
    Query(query): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    let credential = token.as_deref().ok_or(AppError::SessionExpired)?;
    match query.user_id.as_deref() {
        Some(user_id) => state.resume_cache.invalidate(user_id, credential),
        None => state.resume_cache.invalidate_token(credential),
    }
    Ok(StatusCode::NO_CONTENT)
}
