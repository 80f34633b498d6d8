//! API request and response types

use serde::{Deserialize, Serialize};

/// Free-text reply
#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

/// Click on an option button
#[derive(Debug, Deserialize)]
pub struct OptionRequest {
    pub label: String,
}

/// Confirmed checkbox selection
#[derive(Debug, Deserialize)]
pub struct CheckboxesRequest {
    #[serde(default)]
    pub selected: Vec<String>,
}

/// Response for session creation
#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
}

/// Response for queued input
#[derive(Debug, Serialize)]
pub struct QueuedResponse {
    pub queued: bool,
}

/// Response for lifecycle actions
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
