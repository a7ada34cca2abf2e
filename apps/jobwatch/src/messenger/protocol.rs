//! Wire types for Pull (request/response) and Push (broadcast) messaging.
//!
//! All messages are closed tagged enums; anything else fails to deserialize
//! and is rejected at the HTTP boundary.

use serde::{Deserialize, Serialize};

use crate::extraction::record::ExtractedJobRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum PullRequest {
    /// Current record, or a placeholder when nothing has been extracted.
    GetJobDetails,
    /// Forces an extraction first, then replies like `GetJobDetails`.
    ExtractNow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullResponse {
    pub success: bool,
    pub data: ExtractedJobRecord,
}

impl PullResponse {
    pub fn ok(data: ExtractedJobRecord) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum PushEvent {
    JobExtracted(ExtractedJobRecord),
    JobCleared,
    PanelStateChanged { visible: bool },
}

impl PushEvent {
    /// Event name as it appears on the SSE stream.
    pub fn name(&self) -> &'static str {
        match self {
            PushEvent::JobExtracted(_) => "job-extracted",
            PushEvent::JobCleared => "job-cleared",
            PushEvent::PanelStateChanged { .. } => "panel-state-changed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum PanelCommand {
    TogglePanel,
    ShowPanel,
    ClosePanel,
    Resize { width: u32 },
}
