//! Pure state transition function
//!
//! Given the same state and event this always yields the same new state and
//! effects. All I/O happens in the executor.

use super::{Effect, Event, TurnError, TurnState};
use crate::transcript::{Part, Turn};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: TurnState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: TurnState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    fn failed(error: TurnError) -> Self {
        Self::new(TurnState::Failed { error })
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("turn already finished in state '{0}'")]
    AlreadyTerminal(&'static str),
    #[error("invalid transition: {event} in state '{state}'")]
    InvalidTransition { state: &'static str, event: String },
}

pub fn transition(state: &TurnState, event: Event) -> Result<TransitionResult, TransitionError> {
    if state.is_terminal() {
        return Err(TransitionError::AlreadyTerminal(state.name()));
    }

    match (state, event) {
        // Start + Begin -> Decision
        (TurnState::Start, Event::Begin { prompt }) => Ok(TransitionResult::new(TurnState::Decision)
            .with_effect(Effect::AppendTurn {
                turn: Turn::user(prompt),
            })
            .with_effect(Effect::RequestDecision)),

        // Decision + reply -> ToolDispatch | Done | Failed, routed on the first part only
        (TurnState::Decision, Event::ModelReplied { turn }) => Ok(match turn.first_part() {
            Some(Part::FunctionCall(call)) => {
                let call = call.clone();
                TransitionResult::new(TurnState::ToolDispatch {
                    turn,
                    call: call.clone(),
                })
                .with_effect(Effect::DispatchTool { call })
            }
            Some(Part::Text(text)) => answered(text.clone(), turn),
            other => TransitionResult::failed(unexpected_part("decision", other)),
        }),

        (TurnState::Decision | TurnState::Synthesis { .. }, Event::ModelFailed { error }) => {
            Ok(TransitionResult::failed(error.into()))
        }

        // ToolDispatch + outcome -> ToolExecuted | Failed
        (TurnState::ToolDispatch { turn, call }, Event::ToolCompleted { result }) => {
            let call_turn = turn.clone();
            let response_turn = Turn::tool_response(call.name.clone(), result.clone());
            Ok(TransitionResult::new(TurnState::ToolExecuted {
                call: call.clone(),
                result,
            })
            .with_effect(Effect::RecordToolResult {
                call_turn,
                response_turn,
            }))
        }

        (TurnState::ToolDispatch { call, .. }, Event::ToolNotFound) => {
            Ok(TransitionResult::failed(TurnError::UnknownTool {
                name: call.name.clone(),
            }))
        }

        (TurnState::ToolDispatch { call, .. }, Event::ToolRejected { reason }) => {
            Ok(TransitionResult::failed(TurnError::InvalidToolArguments {
                name: call.name.clone(),
                reason,
            }))
        }

        (TurnState::ToolDispatch { call, .. }, Event::ToolFailed { cause }) => {
            Ok(TransitionResult::failed(TurnError::ToolExecution {
                name: call.name.clone(),
                cause,
            }))
        }

        // ToolExecuted + recorded -> Synthesis
        (TurnState::ToolExecuted { call, .. }, Event::ToolResultRecorded) => {
            Ok(TransitionResult::new(TurnState::Synthesis {
                tool_name: call.name.clone(),
            })
            .with_effect(Effect::RequestSynthesis))
        }

        // Synthesis + reply -> Done | Failed
        (TurnState::Synthesis { .. }, Event::ModelReplied { turn }) => Ok(match turn.first_part() {
            Some(Part::Text(text)) => answered(text.clone(), turn),
            other => TransitionResult::failed(unexpected_part("synthesis", other)),
        }),

        (state, event) => Err(TransitionError::InvalidTransition {
            state: state.name(),
            event: format!("{event:?}"),
        }),
    }
}

fn answered(response_text: String, turn: Turn) -> TransitionResult {
    TransitionResult::new(TurnState::Done { response_text }).with_effect(Effect::AppendTurn { turn })
}

fn unexpected_part(phase: &str, part: Option<&Part>) -> TurnError {
    match part {
        Some(part) => TurnError::malformed(format!(
            "{phase} reply starts with a {} part",
            part.kind()
        )),
        None => TurnError::malformed(format!("{phase} reply has no parts")),
    }
}
