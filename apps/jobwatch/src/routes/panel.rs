use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::messenger::PanelCommand;
use crate::panel::PanelView;
use crate::state::AppState;

#[derive(Serialize)]
pub struct PanelResponse {
    pub success: bool,
    #[serde(flatten)]
    pub view: PanelView,
}

/// GET /api/v1/panel
pub async fn handle_get_panel(State(state): State<AppState>) -> Json<PanelResponse> {
    Json(PanelResponse {
        success: true,
        view: state.page.shell().view(),
    })
}

/// POST /api/v1/panel
pub async fn handle_panel_command(
    State(state): State<AppState>,
    payload: Result<Json<PanelCommand>, JsonRejection>,
) -> Result<Json<PanelResponse>, AppError> {
    let Json(command) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    Ok(Json(PanelResponse {
        success: true,
        view: state.page.shell().apply(command),
    }))
}
