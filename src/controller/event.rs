//! Events that drive turn transitions

use crate::gateway::ModelGatewayError;
use crate::transcript::Turn;
use serde_json::Value;

#[derive(Debug, Clone)]
pub enum Event {
    /// A new prompt arrived
    Begin { prompt: String },

    /// Gateway produced a model turn (decision or synthesis)
    ModelReplied { turn: Turn },

    /// Gateway call failed
    ModelFailed { error: ModelGatewayError },

    /// Tool ran and returned a value, possibly an error payload
    ToolCompleted { result: Value },

    /// Requested tool is not in the registry
    ToolNotFound,

    /// Arguments did not match the tool's schema
    ToolRejected { reason: String },

    /// Tool raised or panicked
    ToolFailed { cause: String },

    /// Call and response turns are in the transcript
    ToolResultRecorded,
}
