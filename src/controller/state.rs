//! Turn controller states

use super::TurnError;
use crate::transcript::{FunctionCall, Turn};
use serde_json::Value;

/// Where a single invocation is in its lifecycle
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TurnState {
    /// Nothing has happened yet
    #[default]
    Start,

    /// Waiting on the model's decision
    Decision,

    /// Looking up, validating, and running the requested tool. `turn` is the
    /// model reply that carried `call`, recorded as-is once the tool returns.
    ToolDispatch { turn: Turn, call: FunctionCall },

    /// Tool returned; its exchange is being written to the transcript
    ToolExecuted { call: FunctionCall, result: Value },

    /// Waiting on the model's final answer
    Synthesis { tool_name: String },

    Done { response_text: String },

    Failed { error: TurnError },
}

impl TurnState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TurnState::Done { .. } | TurnState::Failed { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            TurnState::Start => "start",
            TurnState::Decision => "decision",
            TurnState::ToolDispatch { .. } => "tool_dispatch",
            TurnState::ToolExecuted { .. } => "tool_executed",
            TurnState::Synthesis { .. } => "synthesis",
            TurnState::Done { .. } => "done",
            TurnState::Failed { .. } => "failed",
        }
    }
}
