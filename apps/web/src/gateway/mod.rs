/// API gateway — the single point of entry for every call to the external résumé backend.
///
/// No other module talks to the backend directly. Calls are plain request/response:
/// nothing here retries, and a 401 from the backend surfaces as `SessionExpired` so the
/// browser can send the user back to sign-in.
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::backend::{
    CoverLetter, OptimizeEnvelope, ResumeListEnvelope, ResumeSummary, ScoreEnvelope,
};
use crate::models::resume::ResumeDocument;
use crate::models::score::ScoreResult;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend error (status {status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Backend session expired")]
    SessionExpired,

    #[error("Unexpected backend response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid backend path: {0}")]
    InvalidPath(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Request / response shapes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyMethod {
    Get,
    Post,
}

/// A browser request to forward verbatim.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: ProxyMethod,
    /// Backend-relative path, optionally with a query string.
    pub path: String,
    pub content_type: Option<String>,
    pub body: Bytes,
    pub token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProxyResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Inputs of the score and optimize calls: a fresh file or a stored résumé id, plus the
/// job description.
#[derive(Debug, Clone, Default)]
pub struct ResumeUpload {
    pub file: Option<UploadedFile>,
    pub resume_id: Option<String>,
    pub job_description: String,
}

impl ResumeUpload {
    fn into_form(self) -> Result<Form, GatewayError> {
        let mut form = Form::new().text("job_description", self.job_description);
        if let Some(resume_id) = self.resume_id {
            form = form.text("resume_id", resume_id);
        }
        if let Some(file) = self.file {
            let mut part = Part::bytes(file.data.to_vec()).file_name(file.file_name);
            if let Some(content_type) = file.content_type.as_deref() {
                part = part.mime_str(content_type)?;
            }
            form = form.part("file", part);
        }
        Ok(form)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterviewKind {
    Questions,
    AnswerTips,
    Simulate,
}

impl InterviewKind {
    pub fn path(self) -> &'static str {
        match self {
            InterviewKind::Questions => "interview/questions",
            InterviewKind::AnswerTips => "interview/answer-tips",
            InterviewKind::Simulate => "interview/simulate",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Backend trait
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait ResumeBackend: Send + Sync {
    /// Forwards a request and returns the backend's status and body unchanged.
    async fn forward(&self, request: ProxyRequest) -> Result<ProxyResponse, GatewayError>;

    async fn score(&self, token: Option<&str>, upload: ResumeUpload) -> Result<ScoreResult, GatewayError>;

    async fn optimize(
        &self,
        token: Option<&str>,
        upload: ResumeUpload,
    ) -> Result<ResumeDocument, GatewayError>;

    async fn generate_cover_letter(
        &self,
        token: Option<&str>,
        request: Value,
    ) -> Result<CoverLetter, GatewayError>;

    /// Interview answers differ per kind and are passed through as JSON.
    async fn interview(
        &self,
        token: Option<&str>,
        kind: InterviewKind,
        request: Value,
    ) -> Result<Value, GatewayError>;

    async fn list_resumes(
        &self,
        token: Option<&str>,
        user_id: &str,
    ) -> Result<Vec<ResumeSummary>, GatewayError>;
}

// ────────────────────────────────────────────────────────────────────────────
// HTTP implementation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> Result<String, GatewayError> {
        Ok(format!("{}/{}", self.base_url, validate_path(path)?))
    }

    fn authorize(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
            None => builder,
        }
    }

    /// Sends `builder` and decodes a 2xx JSON body into `T`.
    async fn send_json<T: DeserializeOwned>(
        &self,
        path: &str,
        builder: RequestBuilder,
    ) -> Result<T, GatewayError> {
        let response = builder.header(ACCEPT, "application/json").send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(backend_error(path, status, &body));
        }
        debug!("Backend call {path} succeeded ({} bytes)", body.len());
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl ResumeBackend for HttpBackend {
    async fn forward(&self, request: ProxyRequest) -> Result<ProxyResponse, GatewayError> {
        let url = self.url(&request.path)?;
        let builder = match request.method {
            ProxyMethod::Get => self
                .client
                .get(&url)
                .header(ACCEPT, "application/json")
                .header(CONTENT_TYPE, "application/json"),
            ProxyMethod::Post => {
                let builder = self.client.post(&url).body(request.body);
                match request.content_type.as_deref() {
                    Some(content_type) => builder.header(CONTENT_TYPE, content_type),
                    None => builder,
                }
            }
        };
        let response = Self::authorize(builder, request.token.as_deref())
            .send()
            .await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?;
        debug!("Proxied {:?} {} -> {status}", request.method, request.path);

        Ok(ProxyResponse {
            status,
            content_type,
            body,
        })
    }

    async fn score(&self, token: Option<&str>, upload: ResumeUpload) -> Result<ScoreResult, GatewayError> {
        let path = "resume/score";
        let builder = self.client.post(self.url(path)?).multipart(upload.into_form()?);
        let envelope: ScoreEnvelope = self.send_json(path, Self::authorize(builder, token)).await?;
        Ok(envelope.data)
    }

    async fn optimize(
        &self,
        token: Option<&str>,
        upload: ResumeUpload,
    ) -> Result<ResumeDocument, GatewayError> {
        let path = "resume/optimize";
        let builder = self.client.post(self.url(path)?).multipart(upload.into_form()?);
        let envelope: OptimizeEnvelope =
            self.send_json(path, Self::authorize(builder, token)).await?;
        Ok(envelope.into_document())
    }

    async fn generate_cover_letter(
        &self,
        token: Option<&str>,
        request: Value,
    ) -> Result<CoverLetter, GatewayError> {
        let path = "cover-letter/generate";
        let builder = self.client.post(self.url(path)?).json(&request);
        self.send_json(path, Self::authorize(builder, token)).await
    }

    async fn interview(
        &self,
        token: Option<&str>,
        kind: InterviewKind,
        request: Value,
    ) -> Result<Value, GatewayError> {
        let path = kind.path();
        let builder = self.client.post(self.url(path)?).json(&request);
        self.send_json(path, Self::authorize(builder, token)).await
    }

    async fn list_resumes(
        &self,
        token: Option<&str>,
        user_id: &str,
    ) -> Result<Vec<ResumeSummary>, GatewayError> {
        let path = "resume/list";
        let builder = self
            .client
            .get(self.url(path)?)
            .query(&[("user_id", user_id)]);
        let envelope: ResumeListEnvelope =
            self.send_json(path, Self::authorize(builder, token)).await?;
        Ok(envelope.data)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Accepts only backend-relative paths: no scheme, no host, no parent segments.
fn validate_path(path: &str) -> Result<&str, GatewayError> {
    let trimmed = path.trim().trim_start_matches('/');
    let route = trimmed.split('?').next().unwrap_or_default();
    let escapes_base = match fully_decoded(route) {
        Some(decoded) => decoded
            .split(['/', '\\'])
            .any(|segment| segment == ".." || segment == "."),
        None => true,
    };
    if trimmed.is_empty() || trimmed.contains("://") || path.trim().starts_with("//") || escapes_base {
        return Err(GatewayError::InvalidPath(path.to_string()));
    }
    Ok(trimmed)
}

const MAX_DECODE_PASSES: usize = 4;

/// Percent-decodes until the text stops changing, so `%252e` is seen as `.`.
/// `None` for invalid UTF-8 or escapes nested deeper than `MAX_DECODE_PASSES`.
fn fully_decoded(route: &str) -> Option<String> {
    let mut current = route.to_string();
    for _ in 0..MAX_DECODE_PASSES {
        let decoded = urlencoding::decode(&current).ok()?.into_owned();
        if decoded == current {
            return Some(current);
        }
        current = decoded;
    }
    None
}

fn backend_error(path: &str, status: StatusCode, body: &[u8]) -> GatewayError {
    if status == StatusCode::UNAUTHORIZED {
        warn!("Backend rejected credentials for {path}");
        return GatewayError::SessionExpired;
    }
    let message = backend_message(status.as_u16(), body);
    warn!("Backend call {path} failed with {status}: {message}");
    GatewayError::Backend {
        status: status.as_u16(),
        message,
    }
}

/// Extracts a human-readable message from an error body: `detail`, then `message`, then
/// `error` (string or `{ "message": .. }`). Unstructured bodies get a generic message.
pub fn backend_message(status: u16, body: &[u8]) -> String {
    let structured = serde_json::from_slice::<Value>(body).ok().and_then(|value| {
        ["detail", "message", "error"]
            .iter()
            .find_map(|key| match value.get(key)? {
                Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
                Value::Object(inner) => inner
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                Value::Array(items) => items
                    .iter()
                    .find_map(|item| item.get("msg").and_then(Value::as_str))
                    .map(str::to_string),
                _ => None,
            })
    });
    structured.unwrap_or_else(|| format!("Backend request failed with status {status}"))
}
