use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::edit::EditError;
use crate::gateway::GatewayError;
use crate::layout::RenderError;
use crate::session::SessionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Session expired")]
    SessionExpired,

    /// The backend answered with an error; its status and message are passed on.
    #[error("Backend error (status {status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Backend unreachable: {0}")]
    BackendUnavailable(String),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error("PDF generation failed: {0}")]
    Render(#[from] RenderError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<GatewayError> for AppError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::SessionExpired => AppError::SessionExpired,
            GatewayError::Backend { status, message } => AppError::Backend { status, message },
            GatewayError::InvalidPath(path) => {
                AppError::Validation(format!("Invalid backend path '{path}'"))
            }
            GatewayError::Http(e) => AppError::BackendUnavailable(e.to_string()),
            GatewayError::Parse(e) => {
                AppError::Internal(anyhow::Error::new(e).context("Malformed backend response"))
            }
        }
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::NotFound(id) => AppError::NotFound(format!("Edit session {id} not found")),
            SessionError::Edit(e) => AppError::Edit(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::SessionExpired => (
                StatusCode::UNAUTHORIZED,
                "SESSION_EXPIRED",
                "Your session has expired. Please sign in again.".to_string(),
            ),
            AppError::Backend { status, message } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                "BACKEND_ERROR",
                message.clone(),
            ),
            AppError::BackendUnavailable(msg) => {
                tracing::error!("Backend unreachable: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "BACKEND_UNAVAILABLE",
                    "The service is temporarily unavailable".to_string(),
                )
            }
            AppError::Edit(e) => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_EDIT", e.to_string()),
            AppError::Render(e) => {
                tracing::error!("PDF render error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PDF_GENERATION_FAILED",
                    "Failed to generate PDF. Please try again.".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
