use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::errors::AppError;
use crate::messenger::{PullRequest, PullResponse};
use crate::state::AppState;

/// POST /api/v1/messages
/// Pull channel: `getJobDetails` or `extractNow`. Unknown actions are a 400.
pub async fn handle_pull(
    State(state): State<AppState>,
    payload: Result<Json<PullRequest>, JsonRejection>,
) -> Result<Json<PullResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let response = state.page.pull(request).await?;
    Ok(Json(response))
}
