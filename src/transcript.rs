//! Conversation transcript types
//!
//! A transcript is an ordered, append-only list of role-attributed turns.
//! Turns check their parts when they are built and when they are
//! deserialized, so a client-supplied history cannot carry a function call
//! inside a user turn or an empty turn.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Full ordered history of a conversation
pub type Transcript = Vec<Turn>;

/// Author of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Model,
    Tool,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
            Role::Tool => "tool",
        }
    }

    /// Whether a part of this kind may appear in a turn with this role
    pub fn allows(self, part: &Part) -> bool {
        match self {
            Role::User => matches!(part, Part::Text(_)),
            Role::Model => matches!(part, Part::Text(_) | Part::FunctionCall(_)),
            Role::Tool => matches!(part, Part::FunctionResponse(_)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A capability invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Map<String, Value>,
    /// Opaque provider token tied to this call. Thinking models reject a
    /// follow-up request unless it is sent back with the call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, args: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            args,
            signature: None,
        }
    }

    #[must_use]
    pub fn with_signature(mut self, signature: Option<String>) -> Self {
        self.signature = signature;
        self
    }
}

/// The value a capability returned for a [`FunctionCall`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub name: String,
    #[serde(rename = "response", default)]
    pub result: Value,
}

/// Smallest unit of turn content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Part {
    Text(String),
    FunctionCall(FunctionCall),
    FunctionResponse(FunctionResponse),
}

impl Part {
    pub fn text(value: impl Into<String>) -> Self {
        Part::Text(value.into())
    }

    /// Short name of the variant, for logs and error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Part::Text(_) => "text",
            Part::FunctionCall(_) => "function_call",
            Part::FunctionResponse(_) => "function_response",
        }
    }
}

/// Why a turn could not be built
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurnShapeError {
    #[error("{role} turn must contain at least one part")]
    EmptyParts { role: Role },
    #[error("{role} turn cannot contain a {part} part")]
    PartNotAllowed { role: Role, part: &'static str },
}

/// One role-attributed contribution to the conversation
///
/// Invariants: `parts` is non-empty and every part is allowed for `role`
/// (see [`Role::allows`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTurn")]
pub struct Turn {
    role: Role,
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct RawTurn {
    role: Role,
    parts: Vec<Part>,
}

impl TryFrom<RawTurn> for Turn {
    type Error = TurnShapeError;

    fn try_from(raw: RawTurn) -> Result<Self, Self::Error> {
        Turn::new(raw.role, raw.parts)
    }
}

impl Turn {
    pub fn new(role: Role, parts: Vec<Part>) -> Result<Self, TurnShapeError> {
        if parts.is_empty() {
            return Err(TurnShapeError::EmptyParts { role });
        }
        if let Some(bad) = parts.iter().find(|p| !role.allows(p)) {
            return Err(TurnShapeError::PartNotAllowed {
                role,
                part: bad.kind(),
            });
        }
        Ok(Self { role, parts })
    }

    /// User turn holding a single prompt
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::text(text)],
        }
    }

    /// Model turn holding a single text answer
    pub fn model_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            parts: vec![Part::text(text)],
        }
    }

    /// Model turn requesting a single capability invocation
    pub fn function_call(name: impl Into<String>, args: Map<String, Value>) -> Self {
        Self {
            role: Role::Model,
            parts: vec![Part::FunctionCall(FunctionCall::new(name, args))],
        }
    }

    /// Tool turn carrying one capability result
    pub fn tool_response(name: impl Into<String>, result: Value) -> Self {
        Self {
            role: Role::Tool,
            parts: vec![Part::FunctionResponse(FunctionResponse {
                name: name.into(),
                result,
            })],
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// The part the controller routes on. Always `Some` for a constructed turn.
    pub fn first_part(&self) -> Option<&Part> {
        self.parts.first()
    }
}
