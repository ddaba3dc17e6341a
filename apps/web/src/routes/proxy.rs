use axum::{
    body::{Body, Bytes},
    extract::{Query, State},
    http::{header::CONTENT_TYPE, HeaderMap, Method, StatusCode},
    response::Response,
};
use serde::Deserialize;

use crate::auth::BearerToken;
use crate::errors::AppError;
use crate::gateway::{ProxyMethod, ProxyRequest};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ProxyQuery {
    pub path: String,
}

/// GET|POST /api/proxy?path=<backend-path>
/// Forwards to the backend and answers with its status and body verbatim.
pub async fn handle_proxy(
    State(state): State<AppState>,
    method: Method,
    token: BearerToken,
    Query(query): Query<ProxyQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let method = match method {
        Method::GET => ProxyMethod::Get,
        Method::POST => ProxyMethod::Post,
        other => return Err(AppError::Validation(format!("Method {other} cannot be proxied"))),
    };
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let forwarded = state
        .backend
        .forward(ProxyRequest {
            method,
            path: query.path,
            content_type,
            body,
            token: token.0,
        })
        .await?;

    let mut response = Response::builder()
        .status(StatusCode::from_u16(forwarded.status).unwrap_or(StatusCode::BAD_GATEWAY));
    if let Some(content_type) = forwarded.content_type {
        response = response.header(CONTENT_TYPE, content_type);
    }
    response
        .body(Body::from(forwarded.body))
        .map_err(|e| AppError::Internal(e.into()))
}
