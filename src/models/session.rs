//! Request bodies for the conference page: whiteboard input, conference
//! controls and chat.

use serde::Deserialize;

/// A pointer position in page (client) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerInput {
    pub client_x: f64,
    pub client_y: f64,
}

/// A touch event; only the first touch point is honoured.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TouchInput {
    #[serde(default)]
    pub touches: Vec<PointerInput>,
}

/// Container geometry reported by the page on load and on window resize.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeRequest {
    pub container_width: u32,
    pub container_height: u32,
    /// Canvas bounding-rect origin in client coordinates
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub top: f64,
}

/// Brush settings from the toolbar.
#[derive(Debug, Clone, Deserialize)]
pub struct BrushRequest {
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub size: Option<u32>,
}

/// Request body for the join dialog.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinClassroomRequest {
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub name: String,
}

/// Request body for adding a participant directly.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddParticipantRequest {
    #[serde(default)]
    pub name: String,
}

/// Request body for the chat input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub text: String,
}

/// Request body announcing a shared file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareFileRequest {
    #[serde(default)]
    pub file_name: String,
}
