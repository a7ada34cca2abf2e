pub mod analyze;
pub mod events;
pub mod health;
pub mod host;
pub mod job;
pub mod messages;
pub mod panel;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Page shim
        .route("/api/v1/host/events", post(host::handle_host_event))
        // Pull / Push messaging
        .route("/api/v1/messages", post(messages::handle_pull))
        .route("/api/v1/events", get(events::handle_events))
        // Panel shell
        .route(
            "/api/v1/panel",
            get(panel::handle_get_panel).post(panel::handle_panel_command),
        )
        .route("/api/v1/job/status", get(job::handle_job_status))
        .route("/api/v1/analyze", post(analyze::handle_analyze))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use futures::StreamExt;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::extraction::coordinator::tests::{job_page_html, JOB_URL};
    use crate::extraction::JobSubmission;
    use crate::scoring::{ResumeUpload, ScoringBackend, ScoringError};

    const BOUNDARY: &str = "jobwatch-test-boundary";

    #[derive(Default)]
    struct StubScoring {
        submissions: Mutex<Vec<(String, JobSubmission)>>,
    }

    #[async_trait]
    impl ScoringBackend for StubScoring {
        async fn analyze(
            &self,
            resume: ResumeUpload,
            job: &JobSubmission,
        ) -> Result<Value, ScoringError> {
            self.submissions
                .lock()
                .unwrap()
                .push((resume.file_name, job.clone()));
            Ok(json!({"overall_score": 81}))
        }
    }

    fn test_config() -> Config {
        Config {
            port: 0,
            rust_log: "debug".into(),
            scoring_api_url: "http://127.0.0.1:9".into(),
            extraction_debounce: Duration::from_millis(500),
            url_poll_interval: Duration::from_millis(1000),
            launcher_debounce: Duration::from_millis(300),
            stale_after: Duration::from_secs(300),
        }
    }

    fn test_app() -> (Router, AppState, Arc<StubScoring>) {
        let scoring = Arc::new(StubScoring::default());
        let state = AppState::new(test_config(), scoring.clone());
        (build_router(state.clone()), state, scoring)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn resume_upload() -> Request<Body> {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"resume\"; filename=\"cv.pdf\"\r\n\
             Content-Type: application/pdf\r\n\r\n\
             %PDF-1.4 fake\r\n\
             --{BOUNDARY}--\r\n"
        );
        Request::builder()
            .method("POST")
            .uri("/api/v1/analyze")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn load(app: &Router, url: &str, html: &str) {
        let (status, _) = send(
            app,
            post_json(
                "/api/v1/host/events",
                json!({"type": "loaded", "url": url, "html": html}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
    }

    /// Reads SSE frames until one named `name` arrives, skipping others.
    async fn next_sse_event<S>(stream: &mut S, buffer: &mut String, name: &str) -> Value
    where
        S: futures::Stream<Item = Result<bytes::Bytes, axum::Error>> + Unpin,
    {
        let wanted = format!("event: {name}");
        loop {
            while let Some(end) = buffer.find("\n\n") {
                let frame: String = buffer.drain(..end + 2).collect();
                if frame.lines().any(|line| line == wanted) {
                    let data = frame
                        .lines()
                        .find_map(|line| line.strip_prefix("data: "))
                        .unwrap();
                    return serde_json::from_str(data).unwrap();
                }
            }
            let chunk = tokio::time::timeout(Duration::from_secs(5), stream.next())
                .await
                .expect("timed out waiting for SSE frame")
                .expect("SSE stream ended")
                .unwrap();
            buffer.push_str(std::str::from_utf8(&chunk).unwrap());
        }
    }

    #[tokio::test]
    async fn test_events_stream_pushes_extraction_and_clear() {
        let (app, _, _) = test_app();
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/events")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "text/event-stream");
        let mut stream = response.into_body().into_data_stream();
        let mut buffer = String::new();

        load(&app, JOB_URL, &job_page_html()).await;
        let extracted = next_sse_event(&mut stream, &mut buffer, "job-extracted").await;
        assert_eq!(extracted["type"], "job-extracted");
        assert_eq!(extracted["data"]["jobTitle"], "Senior Backend Engineer");
        assert_eq!(extracted["data"]["company"], "Acme Corp");
        assert_eq!(extracted["data"]["url"], JOB_URL);

        let (status, _) = send(
            &app,
            post_json("/api/v1/host/events", json!({"type": "unload"})),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        let cleared = next_sse_event(&mut stream, &mut buffer, "job-cleared").await;
        assert_eq!(cleared["type"], "job-cleared");
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _, _) = test_app();
        let (status, body) = send(
            &app,
            Request::builder().uri("/health").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "jobwatch");
        assert_eq!(body["attached"], false);
    }

    #[tokio::test]
    async fn test_pull_without_session_is_503() {
        let (app, _, _) = test_app();
        let (status, body) = send(
            &app,
            post_json("/api/v1/messages", json!({"action": "getJobDetails"})),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "CONTENT_SCRIPT_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_unknown_action_is_400() {
        let (app, _, _) = test_app();
        let (status, body) = send(
            &app,
            post_json("/api/v1/messages", json!({"action": "scrapeEverything"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_host_event_is_400() {
        let (app, _, _) = test_app();
        let (status, _) = send(
            &app,
            post_json("/api/v1/host/events", json!({"type": "scrolled"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_loaded_page_answers_pull_and_status() {
        let (app, state, _) = test_app();
        load(&app, JOB_URL, &job_page_html()).await;

        let (status, body) = send(
            &app,
            post_json("/api/v1/messages", json!({"action": "getJobDetails"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["jobTitle"], "Senior Backend Engineer");
        assert_eq!(body["data"]["company"], "Acme Corp");

        let (status, body) = send(
            &app,
            Request::builder()
                .uri("/api/v1/job/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isActive"], true);
        assert_eq!(body["currentJobData"]["url"], JOB_URL);

        let (_, body) = send(
            &app,
            Request::builder().uri("/health").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(body["attached"], true);

        state.page.teardown().await;
    }

    #[tokio::test]
    async fn test_panel_commands() {
        let (app, _, _) = test_app();
        let (status, body) = send(
            &app,
            post_json("/api/v1/panel", json!({"command": "toggle_panel"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["visible"], true);
        assert_eq!(body["width"], 450);

        let (_, body) = send(
            &app,
            post_json("/api/v1/panel", json!({"command": "resize", "width": 1200})),
        )
        .await;
        assert_eq!(body["width"], 800);

        let (_, body) = send(
            &app,
            post_json("/api/v1/panel", json!({"command": "show_panel"})),
        )
        .await;
        assert_eq!(body["visible"], true);

        let (_, body) = send(
            &app,
            post_json("/api/v1/panel", json!({"command": "close_panel"})),
        )
        .await;
        assert_eq!(body["visible"], false);

        let (status, _) = send(
            &app,
            post_json("/api/v1/panel", json!({"command": "maximize"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_analyze_forwards_sufficient_job() {
        let (app, state, scoring) = test_app();
        load(&app, JOB_URL, &job_page_html()).await;

        let (status, body) = send(&app, resume_upload()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["overall_score"], 81);

        let submissions = scoring.submissions.lock().unwrap().clone();
        assert_eq!(submissions.len(), 1);
        let (file_name, job) = &submissions[0];
        assert_eq!(file_name, "cv.pdf");
        assert_eq!(job.job_title.as_deref(), Some("Senior Backend Engineer"));
        assert_eq!(job.url, JOB_URL);

        state.page.teardown().await;
    }

    #[tokio::test]
    async fn test_analyze_refuses_insufficient_description() {
        let (app, state, scoring) = test_app();
        load(
            &app,
            JOB_URL,
            "<html><body><h1>Senior Backend Engineer</h1><p>Short</p></body></html>",
        )
        .await;

        let (status, body) = send(&app, resume_upload()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "INSUFFICIENT_DESCRIPTION");
        assert!(scoring.submissions.lock().unwrap().is_empty());

        state.page.teardown().await;
    }

    #[tokio::test]
    async fn test_analyze_without_page_is_503() {
        let (app, _, _) = test_app();
        let (status, _) = send(&app, resume_upload()).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
