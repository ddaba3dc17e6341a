use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderValue,
    },
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::layout::{render_pdf, render_preview, LayoutPreview, PageConfig, RenderError, RenderedPdf};
use crate::models::resume::ResumeDocument;
use crate::state::AppState;

const EXPORT_FILE_NAME: &str = "optimized-resume.pdf";
const OVERFLOW_HEADER: &str = "x-layout-overflow-pt";

/// Lays out the document off the async executor.
async fn render_blocking(
    document: Arc<ResumeDocument>,
    page_config: PageConfig,
) -> Result<RenderedPdf, AppError> {
    let rendered = tokio::task::spawn_blocking(move || render_pdf(&document, &page_config))
        .await
        .map_err(|e| RenderError::Task(e.to_string()))??;
    Ok(rendered)
}

fn pdf_response(rendered: RenderedPdf) -> Response {
    let mut response = (
        [
            (CONTENT_TYPE, "application/pdf".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        rendered.bytes,
    )
        .into_response();

    if let Some(overflow) = rendered.page_fill.overflow_pt() {
        if let Ok(value) = HeaderValue::from_str(&format!("{overflow:.1}")) {
            response.headers_mut().insert(OVERFLOW_HEADER, value);
        }
    }
    response
}

/// GET /api/sessions/:id/export.pdf
/// Pending bullet drafts are committed before rendering.
pub async fn handle_session_export(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let document = state.sessions.export_document(id).await?;
    let rendered = render_blocking(document, state.page_config.clone()).await?;
    Ok(pdf_response(rendered))
}

/// POST /api/export/pdf
pub async fn handle_document_export(
    State(state): State<AppState>,
    Json(document): Json<ResumeDocument>,
) -> Result<Response, AppError> {
    let rendered = render_blocking(Arc::new(document), state.page_config.clone()).await?;
    Ok(pdf_response(rendered))
}

/// GET /api/sessions/:id/preview
/// Draw operations of the committed document, for the in-browser page preview.
pub async fn handle_session_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LayoutPreview>, AppError> {
    let document = state.sessions.document(id).await?;
    let page_config = state.page_config.clone();
    let preview = tokio::task::spawn_blocking(move || render_preview(&document, &page_config))
        .await
        .map_err(|e| RenderError::Task(e.to_string()))?;
    Ok(Json(preview))
}
