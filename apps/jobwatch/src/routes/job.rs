use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::extraction::ExtractedJobRecord;
use crate::state::AppState;

/// What the side panel shows about the current job.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    pub is_active: bool,
    pub last_extracted: Option<DateTime<Utc>>,
    pub current_job_data: Option<ExtractedJobRecord>,
}

impl JobStatus {
    pub fn from_latest(
        latest: Option<ExtractedJobRecord>,
        now: DateTime<Utc>,
        stale_after: std::time::Duration,
    ) -> Self {
        let is_active = latest
            .as_ref()
            .is_some_and(|record| !record.is_stale(now, stale_after));
        Self {
            is_active,
            last_extracted: latest.as_ref().map(|record| record.extracted_at),
            current_job_data: latest,
        }
    }
}

/// GET /api/v1/job/status
pub async fn handle_job_status(State(state): State<AppState>) -> Json<JobStatus> {
    Json(JobStatus::from_latest(
        state.broadcaster.latest(),
        Utc::now(),
        state.config.stale_after,
    ))
}
