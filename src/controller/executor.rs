//! Turn executor
//!
//! Runs the effects produced by [`transition`] and feeds the resulting events
//! back in until the turn reaches a terminal state.

use super::{transition, Effect, Event, TurnError, TurnState};
use crate::gateway::ModelGateway;
use crate::tools::{schema, ToolRegistry};
use crate::transcript::{FunctionCall, Part, Transcript, Turn};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

/// What the caller gets back from a completed turn
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub response_text: String,
    /// Prior history plus everything this turn appended
    pub updated_history: Transcript,
    pub debug: DebugInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DebugInfo {
    pub tool_called: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_args: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_result: Option<Value>,
    pub history_items_in: usize,
    pub history_items_out: usize,
}

/// Drives one prompt through decision, optional tool dispatch, and synthesis
///
/// Holds only shared, read-only collaborators, so one controller can serve
/// any number of concurrent turns.
pub struct TurnController<G: ModelGateway> {
    gateway: G,
    registry: Arc<ToolRegistry>,
}

impl<G: ModelGateway> TurnController<G> {
    pub fn new(gateway: G, registry: Arc<ToolRegistry>) -> Self {
        Self { gateway, registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Run one turn against `history`. On failure nothing is returned for the
    /// transcript; the caller still owns the unchanged `history`.
    pub async fn run(&self, history: &[Turn], prompt: &str) -> Result<TurnOutcome, TurnError> {
        let started = Instant::now();
        let mut working = history.to_vec();
        let mut info = DebugInfo {
            history_items_in: history.len(),
            ..DebugInfo::default()
        };

        let mut state = TurnState::default();
        let mut pending = VecDeque::from([Event::Begin {
            prompt: prompt.to_string(),
        }]);

        while let Some(event) = pending.pop_front() {
            let result = transition(&state, event).map_err(|e| {
                tracing::error!(state = state.name(), error = %e, "Turn state machine rejected event");
                TurnError::Internal(e.to_string())
            })?;

            tracing::debug!(from = state.name(), to = result.new_state.name(), "Turn transition");
            state = result.new_state;

            for effect in result.effects {
                if let Some(next) = self.execute_effect(effect, &mut working, &mut info).await {
                    pending.push_back(next);
                }
            }
        }

        match state {
            TurnState::Done { response_text } => {
                info.history_items_out = working.len();
                tracing::info!(
                    tool_called = info.tool_called.as_deref().unwrap_or("none"),
                    history_in = info.history_items_in,
                    history_out = info.history_items_out,
                    duration_ms = %started.elapsed().as_millis(),
                    "Turn completed"
                );
                Ok(TurnOutcome {
                    response_text,
                    updated_history: working,
                    debug: info,
                })
            }
            TurnState::Failed { error } => {
                tracing::warn!(
                    kind = ?error.kind(),
                    error = %error,
                    duration_ms = %started.elapsed().as_millis(),
                    "Turn failed"
                );
                Err(error)
            }
            other => Err(TurnError::Internal(format!(
                "turn stalled in state '{}'",
                other.name()
            ))),
        }
    }

    async fn execute_effect(
        &self,
        effect: Effect,
        working: &mut Vec<Turn>,
        info: &mut DebugInfo,
    ) -> Option<Event> {
        match effect {
            Effect::AppendTurn { turn } => {
                working.push(turn);
                None
            }
            Effect::RequestDecision => Some(
                match self.gateway.decide(working, self.registry.descriptors()).await {
                    Ok(turn) => Event::ModelReplied { turn },
                    Err(error) => Event::ModelFailed { error },
                },
            ),
            Effect::DispatchTool { call } => {
                info.tool_called = Some(call.name.clone());
                info.tool_args = Some(call.args.clone());
                Some(self.dispatch_tool(call).await)
            }
            Effect::RecordToolResult {
                call_turn,
                response_turn,
            } => {
                if let Some(Part::FunctionResponse(response)) = response_turn.first_part() {
                    info.tool_result = Some(response.result.clone());
                }
                working.push(call_turn);
                working.push(response_turn);
                Some(Event::ToolResultRecorded)
            }
            Effect::RequestSynthesis => Some(match self.gateway.synthesize(working).await {
                Ok(turn) => Event::ModelReplied { turn },
                Err(error) => Event::ModelFailed { error },
            }),
        }
    }

    /// Look up, validate, and run a tool. The tool runs on its own task so a
    /// panic surfaces as a failure of this turn only.
    async fn dispatch_tool(&self, call: FunctionCall) -> Event {
        let Some(tool) = self.registry.lookup(&call.name) else {
            tracing::warn!(tool = %call.name, "Model requested unregistered tool");
            return Event::ToolNotFound;
        };

        if let Err(violation) = schema::validate_args(&tool.input_schema(), &call.args) {
            tracing::warn!(tool = %call.name, error = %violation, "Tool arguments rejected");
            return Event::ToolRejected {
                reason: violation.to_string(),
            };
        }

        let FunctionCall { name, args, .. } = call;
        let started = Instant::now();
        let outcome = tokio::spawn(async move { tool.run(args).await }).await;
        let duration_ms = started.elapsed().as_millis();

        match outcome {
            Ok(Ok(result)) => {
                tracing::info!(tool = %name, %duration_ms, "Tool executed");
                Event::ToolCompleted { result }
            }
            Ok(Err(e)) => {
                tracing::warn!(tool = %name, %duration_ms, error = %e, "Tool failed");
                Event::ToolFailed { cause: e.message }
            }
            Err(join_error) => {
                let cause = if join_error.is_panic() {
                    format!("tool panicked: {}", panic_message(join_error.into_panic()))
                } else {
                    "tool task was cancelled".to_string()
                };
                tracing::error!(tool = %name, %duration_ms, %cause, "Tool task aborted");
                Event::ToolFailed { cause }
            }
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
