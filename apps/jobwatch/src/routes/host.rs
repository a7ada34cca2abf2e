use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};

use crate::errors::AppError;
use crate::host::HostEvent;
use crate::state::AppState;

/// POST /api/v1/host/events
/// Entry point for the page shim: loads, mutations, history calls, unload.
pub async fn handle_host_event(
    State(state): State<AppState>,
    payload: Result<Json<HostEvent>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(event) = payload.map_err(|e| {
        tracing::warn!("unparsable host event: {e}");
        AppError::Validation(e.body_text())
    })?;
    state.page.handle(event).await;
    Ok(StatusCode::ACCEPTED)
}
