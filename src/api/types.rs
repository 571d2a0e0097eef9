//! API request and response types

use crate::controller::DebugInfo;
use crate::tools::ToolDescriptor;
use crate::transcript::Transcript;
use serde::{Deserialize, Serialize};

/// Request to run one turn
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub prompt: String,
    #[serde(default)]
    pub history: Transcript,
}

/// Response for a completed turn
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub updated_history: Transcript,
    pub debug_info: DebugInfo,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

/// Tools offered to the model
#[derive(Debug, Serialize)]
pub struct ToolsResponse {
    pub tools: Vec<ToolDescriptor>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            kind: kind.into(),
        }
    }
}
