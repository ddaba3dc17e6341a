pub mod cover_letter;
pub mod export;
pub mod health;
pub mod interview;
pub mod proxy;
pub mod resume;
pub mod sessions;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Backend passthrough
        .route(
            "/api/proxy",
            get(proxy::handle_proxy).post(proxy::handle_proxy),
        )
        .route("/api/resume/score", post(resume::handle_score))
        .route("/api/resume/optimize", post(resume::handle_optimize))
        .route("/api/resumes", get(resume::handle_list_resumes))
        .route("/api/resumes/cache", delete(resume::handle_invalidate_resumes))
        .route(
            "/api/cover-letter/generate",
            post(cover_letter::handle_generate),
        )
        .route("/api/cover-letter/export", post(cover_letter::handle_export))
        .route("/api/interview/:kind", post(interview::handle_interview))
        // Edit sessions
        .route("/api/sessions", post(sessions::handle_create))
        .route(
            "/api/sessions/:id",
            get(sessions::handle_get)
                .patch(sessions::handle_apply)
                .delete(sessions::handle_delete),
        )
        .route("/api/sessions/:id/drafts", put(sessions::handle_stage_draft))
        .route("/api/sessions/:id/flush", post(sessions::handle_flush))
        .route(
            "/api/sessions/:id/edit-mode",
            post(sessions::handle_toggle_edit_mode),
        )
        .route("/api/sessions/:id/reset", post(sessions::handle_reset))
        // Export
        .route(
            "/api/sessions/:id/export.pdf",
            get(export::handle_session_export),
        )
        .route(
            "/api/sessions/:id/preview",
            get(export::handle_session_preview),
        )
        .route("/api/export/pdf", post(export::handle_document_export))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use bytes::Bytes;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::cache::ResumeListCache;
    use crate::clock::SystemClock;
    use crate::config::Config;
    use crate::gateway::{
        GatewayError, InterviewKind, ProxyMethod, ProxyRequest, ProxyResponse, ResumeBackend,
        ResumeUpload,
    };
    use crate::layout::default_page_config;
    use crate::models::backend::{CoverLetter, ResumeSummary};
    use crate::models::resume::{ContactInfo, ResumeDocument, WorkItem};
    use crate::models::score::ScoreResult;
    use crate::session::SessionStore;

    #[derive(Default)]
    struct FakeBackend {
        list_calls: Mutex<usize>,
        last_upload: Mutex<Option<ResumeUpload>>,
        expired: bool,
    }

    impl FakeBackend {
        fn check(&self) -> Result<(), GatewayError> {
            if self.expired {
                Err(GatewayError::SessionExpired)
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl ResumeBackend for FakeBackend {
        async fn forward(&self, request: ProxyRequest) -> Result<ProxyResponse, GatewayError> {
            let status = if request.method == ProxyMethod::Post { 418 } else { 200 };
            Ok(ProxyResponse {
                status,
                content_type: Some("application/json".into()),
                body: Bytes::from(format!(
                    "{{\"path\":\"{}\",\"token\":{}}}",
                    request.path,
                    request.token.map_or("null".to_string(), |t| format!("\"{t}\""))
                )),
            })
        }

        async fn score(
            &self,
            _token: Option<&str>,
            upload: ResumeUpload,
        ) -> Result<ScoreResult, GatewayError> {
            self.check()?;
            *self.last_upload.lock().unwrap() = Some(upload);
            Ok(ScoreResult {
                match_score: 35.0,
                matched_skills: vec!["Rust".into()],
                missing_skills: vec!["Kubernetes".into()],
                recommendations: vec![],
            })
        }

        async fn optimize(
            &self,
            _token: Option<&str>,
            _upload: ResumeUpload,
        ) -> Result<ResumeDocument, GatewayError> {
            self.check()?;
            Ok(sample_document())
        }

        async fn generate_cover_letter(
            &self,
            _token: Option<&str>,
            request: Value,
        ) -> Result<CoverLetter, GatewayError> {
            self.check()?;
            Ok(CoverLetter {
                cover_letter: format!("Dear {},", request["company"].as_str().unwrap_or("team")),
            })
        }

        async fn interview(
            &self,
            _token: Option<&str>,
            kind: InterviewKind,
            _request: Value,
        ) -> Result<Value, GatewayError> {
            self.check()?;
            Ok(json!({ "kind": kind }))
        }

        async fn list_resumes(
            &self,
            _token: Option<&str>,
            user_id: &str,
        ) -> Result<Vec<ResumeSummary>, GatewayError> {
            self.check()?;
            *self.list_calls.lock().unwrap() += 1;
            Ok(vec![ResumeSummary {
                id: format!("{user_id}-cv"),
                title: Some("cv.pdf".into()),
                created_at: None,
            }])
        }
    }

    #[derive(serde::Deserialize)]
    struct SnapshotSkills {
        document: ResumeDocument,
    }

    fn sample_document() -> ResumeDocument {
        ResumeDocument {
            summary: Some("Engineer".into()),
            work_experience: Some(vec![
                WorkItem {
                    title: "A".into(),
                    bullets: vec!["a0".into(), "a1".into()],
                    ..Default::default()
                },
                WorkItem {
                    title: "B".into(),
                    bullets: vec!["b0".into()],
                    ..Default::default()
                },
            ]),
            contact_details: Some(ContactInfo {
                name: Some("Ada".into()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn test_config() -> Config {
        Config {
            backend_api_url: "http://backend.invalid".into(),
            port: 0,
            rust_log: "debug".into(),
            resume_cache_ttl: Duration::from_secs(300),
            bullet_debounce: Duration::from_millis(300),
            backend_timeout: Duration::from_secs(5),
            edit_session_ttl: Duration::from_secs(1800),
        }
    }

    fn app_with(backend: Arc<FakeBackend>) -> Router {
        let config = test_config();
        let clock = Arc::new(SystemClock);
        build_router(AppState {
            backend,
            sessions: SessionStore::new(config.bullet_debounce, config.edit_session_ttl, clock.clone()),
            resume_cache: ResumeListCache::new(config.resume_cache_ttl, clock),
            config,
            page_config: default_page_config(),
        })
    }

    fn app() -> Router {
        app_with(Arc::new(FakeBackend::default()))
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn authed_request(method: &str, uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    fn multipart_request(uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
        let boundary = "XBOUNDARYX";
        let mut body = String::new();
        for (name, value) in fields {
            if *name == "file" {
                body.push_str(&format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"cv.txt\"\r\nContent-Type: text/plain\r\n\r\n{value}\r\n"
                ));
            } else {
                body.push_str(&format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                ));
            }
        }
        body.push_str(&format!("--{boundary}--\r\n"));
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    async fn create_session(app: &Router) -> String {
        let response = send(
            app,
            json_request("POST", "/api/sessions", serde_json::to_value(sample_document()).unwrap()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["session_id"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let response = send(&app(), empty_request("GET", "/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_score_routes_low_scores_to_needs_improvement() {
        let backend = Arc::new(FakeBackend::default());
        let app = app_with(backend.clone());
        let response = send(
            &app,
            multipart_request(
                "/api/resume/score",
                &[("file", "my resume"), ("job_description", "Rust engineer")],
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["branch"], "needs_improvement");
        assert_eq!(body["data"]["match_score"], 35.0);

        let upload = backend.last_upload.lock().unwrap().take().unwrap();
        assert_eq!(upload.job_description, "Rust engineer");
        assert_eq!(upload.file.unwrap().data.as_ref(), b"my resume");
    }

    #[tokio::test]
    async fn test_score_requires_job_description_and_resume() {
        let app = app();
        let response = send(
            &app,
            multipart_request("/api/resume/score", &[("file", "cv")]),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(
            &app,
            multipart_request("/api/resume/score", &[("job_description", "Rust")]),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_expired_backend_session_is_401() {
        let app = app_with(Arc::new(FakeBackend {
            expired: true,
            ..Default::default()
        }));
        let response = send(
            &app,
            json_request("POST", "/api/cover-letter/generate", json!({"company": "Acme"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"]["code"], "SESSION_EXPIRED");
    }

    #[tokio::test]
    async fn test_optimize_opens_session_and_invalidates_cache() {
        let backend = Arc::new(FakeBackend::default());
        let app = app_with(backend.clone());

        send(&app, authed_request("GET", "/api/resumes?user_id=u1", "t1")).await;
        let response = send(
            &app,
            multipart_request(
                "/api/resume/optimize?user_id=u1",
                &[("resume_id", "r-9"), ("job_description", "Rust engineer")],
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["contact_details"]["name"], "Ada");
        assert_eq!(body["revision"], 0);
        let session_id = body["session_id"].as_str().unwrap().to_string();

        let response = send(&app, empty_request("GET", &format!("/api/sessions/{session_id}"))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let relisted =
            body_json(send(&app, authed_request("GET", "/api/resumes?user_id=u1", "t1")).await).await;
        assert_eq!(relisted["cached"], false);
        assert_eq!(*backend.list_calls.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_resume_list_is_cached_until_invalidated() {
        let backend = Arc::new(FakeBackend::default());
        let app = app_with(backend.clone());
        let list = || authed_request("GET", "/api/resumes?user_id=u1", "t1");

        let first = body_json(send(&app, list()).await).await;
        let second = body_json(send(&app, list()).await).await;
        assert_eq!(first["cached"], false);
        assert_eq!(second["cached"], true);
        assert_eq!(second["data"][0]["id"], "u1-cv");
        assert_eq!(*backend.list_calls.lock().unwrap(), 1);

        let response = send(&app, authed_request("DELETE", "/api/resumes/cache?user_id=u1", "t1")).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let third = body_json(send(&app, list()).await).await;
        assert_eq!(third["cached"], false);
    }

    #[tokio::test]
    async fn test_resume_list_cache_is_not_shared_between_callers() {
        let backend = Arc::new(FakeBackend::default());
        let app = app_with(backend.clone());

        let owner = body_json(send(&app, authed_request("GET", "/api/resumes?user_id=u1", "owner")).await).await;
        assert_eq!(owner["cached"], false);

        let anonymous = body_json(send(&app, empty_request("GET", "/api/resumes?user_id=u1")).await).await;
        assert_eq!(anonymous["cached"], false);
        let other = body_json(send(&app, authed_request("GET", "/api/resumes?user_id=u1", "other")).await).await;
        assert_eq!(other["cached"], false);
        assert_eq!(*backend.list_calls.lock().unwrap(), 3);

        let again = body_json(send(&app, empty_request("GET", "/api/resumes?user_id=u1")).await).await;
        assert_eq!(again["cached"], false);
        assert_eq!(*backend.list_calls.lock().unwrap(), 4);
    }

    #[tokio::test]
    async fn test_cache_invalidation_requires_a_token_and_stays_scoped() {
        let backend = Arc::new(FakeBackend::default());
        let app = app_with(backend.clone());
        send(&app, authed_request("GET", "/api/resumes?user_id=u1", "owner")).await;

        let response = send(&app, empty_request("DELETE", "/api/resumes/cache")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let response = send(&app, authed_request("DELETE", "/api/resumes/cache", "other")).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let owner = body_json(send(&app, authed_request("GET", "/api/resumes?user_id=u1", "owner")).await).await;
        assert_eq!(owner["cached"], true);
        assert_eq!(*backend.list_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_proxy_passes_status_body_and_token_through() {
        let app = app();
        let request = Request::builder()
            .method("POST")
            .uri("/api/proxy?path=jobs/search")
            .header(header::AUTHORIZATION, "Bearer t0k")
            .body(Body::from("{}"))
            .unwrap();
        let response = send(&app, request).await;
        assert_eq!(response.status().as_u16(), 418);
        let body = body_json(response).await;
        assert_eq!(body, json!({"path": "jobs/search", "token": "t0k"}));
    }

    #[tokio::test]
    async fn test_interview_kinds() {
        let app = app();
        let response = send(&app, json_request("POST", "/api/interview/answer-tips", json!({}))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["kind"], "answer-tips");

        let response = send(&app, json_request("POST", "/api/interview/salary", json!({}))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cover_letter_export_is_text_attachment() {
        let response = send(
            &app(),
            json_request("POST", "/api/cover-letter/export", json!({"cover_letter": "Dear Acme,"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"cover_letter.txt\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(bytes.as_ref(), b"Dear Acme,");
    }

    #[tokio::test]
    async fn test_session_keeps_skill_category_order() {
        let app = app();
        let request = Request::builder()
            .method("POST")
            .uri("/api/sessions")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"skills":{"Languages":["Rust"],"Cloud":["AWS"],"Data":["SQL"]}}"#,
            ))
            .unwrap();
        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let snapshot: SnapshotSkills = serde_json::from_slice(&bytes).unwrap();
        let categories: Vec<_> = snapshot.document.skills.unwrap().into_keys().collect();
        assert_eq!(categories, vec!["Languages", "Cloud", "Data"]);
    }

    #[tokio::test]
    async fn test_session_edit_flow() {
        let app = app();
        let id = create_session(&app).await;
        let uri = format!("/api/sessions/{id}");

        let response = send(
            &app,
            json_request(
                "PATCH",
                &uri,
                json!({"op": "update_work", "index": 1, "update": {"set": "title", "value": "Lead"}}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["document"]["work_experience"][1]["title"], "Lead");
        assert_eq!(body["revision"], 1);
        assert_eq!(body["dirty"], true);

        let response = send(
            &app,
            json_request(
                "PATCH",
                &uri,
                json!({"op": "update_work", "index": 7, "update": {"set": "title", "value": "x"}}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(response).await["error"]["code"], "INVALID_EDIT");

        let response = send(
            &app,
            json_request("PUT", &format!("{uri}/drafts"), json!({"item": 0, "bullet": 1, "text": "draft"})),
        )
        .await;
        assert_eq!(body_json(response).await["drafts"][0]["text"], "draft");

        let body = body_json(send(&app, empty_request("POST", &format!("{uri}/flush"))).await).await;
        assert_eq!(body["document"]["work_experience"][0]["bullets"][1], "draft");
        assert_eq!(body["drafts"], json!([]));

        let body = body_json(
            send(&app, json_request("POST", &format!("{uri}/edit-mode"), json!({"section": "work", "index": 0}))).await,
        )
        .await;
        assert_eq!(body["edit_modes"], json!([{"section": "work", "index": 0}]));

        let body = body_json(send(&app, empty_request("POST", &format!("{uri}/reset"))).await).await;
        assert_eq!(body["dirty"], false);
        assert_eq!(body["document"]["work_experience"][1]["title"], "B");

        let response = send(&app, empty_request("DELETE", &uri)).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let response = send(&app, empty_request("GET", &uri)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_session_export_commits_drafts_and_returns_pdf() {
        let app = app();
        let id = create_session(&app).await;
        send(
            &app,
            json_request(
                "PUT",
                &format!("/api/sessions/{id}/drafts"),
                json!({"item": 1, "bullet": 0, "text": "Shipped the exporter"}),
            ),
        )
        .await;

        let response = send(&app, empty_request("GET", &format!("/api/sessions/{id}/export.pdf"))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"optimized-resume.pdf\""
        );
        assert!(response.headers().get("x-layout-overflow-pt").is_none());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF-"));

        let snapshot = body_json(send(&app, empty_request("GET", &format!("/api/sessions/{id}"))).await).await;
        assert_eq!(
            snapshot["document"]["work_experience"][1]["bullets"][0],
            "Shipped the exporter"
        );
    }

    #[tokio::test]
    async fn test_overflowing_export_reports_overflow_header() {
        let items: Vec<Value> = (0..25)
            .map(|i| {
                json!({
                    "title": format!("Role {i}"),
                    "company": "Acme",
                    "dates": "2020",
                    "bullets": vec!["Delivered a great many things for many people"; 4]
                })
            })
            .collect();
        let response = send(
            &app(),
            json_request("POST", "/api/export/pdf", json!({"work_experience": items})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let overflow: f32 = response.headers()["x-layout-overflow-pt"]
            .to_str()
            .unwrap()
            .parse()
            .unwrap();
        assert!(overflow > 0.0);
    }

    #[tokio::test]
    async fn test_preview_lists_draw_operations() {
        let app = app();
        let id = create_session(&app).await;
        let body = body_json(send(&app, empty_request("GET", &format!("/api/sessions/{id}/preview"))).await).await;
        let ops = body["ops"].as_array().unwrap();
        assert!(ops.iter().any(|op| op["op"] == "text" && op["text"] == "Ada"));
        assert_eq!(body["page_fill"]["verdict"]["verdict"], "fits");
    }
}
