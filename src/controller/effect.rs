//! Effects produced by turn transitions

use crate::transcript::{FunctionCall, Turn};

/// Work for the controller to perform after a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append a turn to the working transcript
    AppendTurn { turn: Turn },

    /// Call the gateway with tool descriptors offered
    RequestDecision,

    /// Look up, validate, and run a tool
    DispatchTool { call: FunctionCall },

    /// Append the model's call and the tool's response, in that order
    RecordToolResult { call_turn: Turn, response_turn: Turn },

    /// Call the gateway with no tools offered
    RequestSynthesis,
}
