//! Turn failure taxonomy

use crate::gateway::{GatewayErrorKind, ModelGatewayError};
use serde::Serialize;
use thiserror::Error;

/// Why a turn ended in `Failed`. Every variant is fatal for the invocation
/// that produced it and for nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurnError {
    #[error("model gateway error: {0}")]
    ModelGateway(ModelGatewayError),

    #[error("malformed model response: {reason}")]
    MalformedModelResponse { reason: String },

    /// The model asked for a tool nobody registered
    #[error("model requested unknown tool '{name}'")]
    UnknownTool { name: String },

    #[error("invalid arguments for tool '{name}': {reason}")]
    InvalidToolArguments { name: String, reason: String },

    #[error("tool '{name}' failed: {cause}")]
    ToolExecution { name: String, cause: String },

    #[error("internal error: {0}")]
    Internal(String),
}

/// Stable, client-facing name of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnErrorKind {
    ModelGateway,
    MalformedModelResponse,
    UnknownTool,
    InvalidToolArguments,
    ToolExecution,
    Internal,
}

impl TurnErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TurnErrorKind::ModelGateway => "model_gateway",
            TurnErrorKind::MalformedModelResponse => "malformed_model_response",
            TurnErrorKind::UnknownTool => "unknown_tool",
            TurnErrorKind::InvalidToolArguments => "invalid_tool_arguments",
            TurnErrorKind::ToolExecution => "tool_execution",
            TurnErrorKind::Internal => "internal",
        }
    }
}

impl TurnError {
    pub fn kind(&self) -> TurnErrorKind {
        match self {
            TurnError::ModelGateway(_) => TurnErrorKind::ModelGateway,
            TurnError::MalformedModelResponse { .. } => TurnErrorKind::MalformedModelResponse,
            TurnError::UnknownTool { .. } => TurnErrorKind::UnknownTool,
            TurnError::InvalidToolArguments { .. } => TurnErrorKind::InvalidToolArguments,
            TurnError::ToolExecution { .. } => TurnErrorKind::ToolExecution,
            TurnError::Internal(_) => TurnErrorKind::Internal,
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        TurnError::MalformedModelResponse {
            reason: reason.into(),
        }
    }
}

impl From<ModelGatewayError> for TurnError {
    fn from(error: ModelGatewayError) -> Self {
        match error.kind {
            GatewayErrorKind::MalformedResponse => TurnError::malformed(error.message),
            _ => TurnError::ModelGateway(error),
        }
    }
}
