/// Client for the external résumé scoring backend.
///
/// The backend takes the résumé file and the job JSON as one multipart
/// request and answers with an analysis document, or with `{"error": ...}`
/// when it refuses the input.
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{multipart, Client};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::extraction::JobSubmission;

const ANALYZE_PATH: &str = "/api/analyze";
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("analysis rejected: {0}")]
    Rejected(String),

    #[error("JSON error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// An uploaded résumé, forwarded as-is.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

#[async_trait]
pub trait ScoringBackend: Send + Sync {
    async fn analyze(
        &self,
        resume: ResumeUpload,
        job: &JobSubmission,
    ) -> Result<Value, ScoringError>;
}

#[derive(Clone)]
pub struct HttpScoringBackend {
    client: Client,
    analyze_url: String,
}

impl HttpScoringBackend {
    pub fn new(base_url: &str) -> Result<Self, ScoringError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            analyze_url: format!("{}{ANALYZE_PATH}", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl ScoringBackend for HttpScoringBackend {
    async fn analyze(
        &self,
        resume: ResumeUpload,
        job: &JobSubmission,
    ) -> Result<Value, ScoringError> {
        let job_json = serde_json::to_string(job)?;
        let resume_part = multipart::Part::bytes(resume.bytes.to_vec())
            .file_name(resume.file_name.clone())
            .mime_str(&resume.content_type)?;
        let form = multipart::Form::new()
            .part("resume", resume_part)
            .text("jobData", job_json);

        debug!(url = %self.analyze_url, file = %resume.file_name, "submitting analysis");

        let response = self
            .client
            .post(&self.analyze_url)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("scoring backend returned {status}: {body}");
            return Err(ScoringError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let analysis: Value = response.json().await?;
        if let Some(message) = analysis_error(&analysis) {
            return Err(ScoringError::Rejected(message));
        }

        info!("analysis received");
        Ok(analysis)
    }
}

/// An analysis payload carrying `error` is a failure even on HTTP 200.
pub fn analysis_error(analysis: &Value) -> Option<String> {
    match analysis.get("error")? {
        Value::Null => None,
        Value::String(message) => Some(message.clone()),
        other => Some(other.to_string()),
    }
}

/// Pulls a readable message out of an error body (`error` or `detail`).
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            ["error", "detail"]
                .iter()
                .find_map(|key| json.get(key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| body.to_string())
}
