use axum::{
    extract::{Multipart, State},
    Json,
};
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::messenger::PullRequest;
use crate::scoring::ResumeUpload;
use crate::state::AppState;

const RESUME_FIELD: &str = "resume";

/// POST /api/v1/analyze
/// Scores the uploaded résumé against the job on the current page. The job
/// is re-extracted first; a too-short description is refused before the
/// backend is contacted.
pub async fn handle_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let resume = read_resume(&mut multipart).await?;

    let record = state.page.pull(PullRequest::ExtractNow).await?.data;
    if !record.is_sufficient() {
        return Err(AppError::InsufficientDescription {
            chars: record.description_chars(),
        });
    }

    info!(
        title = %record.job_title,
        resume = %resume.file_name,
        "forwarding analysis request"
    );
    let analysis = state.scoring.analyze(resume, &record.to_submission()).await?;
    Ok(Json(analysis))
}

async fn read_resume(multipart: &mut Multipart) -> Result<ResumeUpload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read multipart: {e}")))?
    {
        if field.name() != Some(RESUME_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("resume").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read résumé: {e}")))?;
        if bytes.is_empty() {
            return Err(AppError::Validation("Résumé file is empty".to_string()));
        }
        return Ok(ResumeUpload {
            file_name,
            content_type,
            bytes,
        });
    }
    Err(AppError::Validation(format!(
        "Missing '{RESUME_FIELD}' file field"
    )))
}
