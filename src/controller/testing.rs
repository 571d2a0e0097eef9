//! Mock gateways and tools for testing
//!
//! These mocks let controller, gateway, and handler tests run without I/O.

use crate::gateway::{ModelGateway, ModelGatewayError};
use crate::tools::{Tool, ToolDescriptor, ToolError};
use crate::transcript::{Part, Turn};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::VecDeque;
use std::sync::Mutex;

// ============================================================================
// Mock Gateway
// ============================================================================

/// One gateway call as the mock saw it
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub transcript: Vec<Turn>,
    /// Names of the tools offered; empty for synthesis
    pub tools: Vec<String>,
}

/// Gateway that returns queued turns in order
pub struct MockGateway {
    replies: Mutex<VecDeque<Result<Turn, ModelGatewayError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

#[allow(dead_code)]
impl MockGateway {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful reply
    pub fn queue_turn(&self, turn: Turn) {
        self.replies.lock().unwrap().push_back(Ok(turn));
    }

    /// Queue a failed call
    pub fn queue_error(&self, error: ModelGatewayError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelGateway for MockGateway {
    async fn generate(
        &self,
        transcript: &[Turn],
        tools: &[ToolDescriptor],
    ) -> Result<Turn, ModelGatewayError> {
        self.calls.lock().unwrap().push(RecordedCall {
            transcript: transcript.to_vec(),
            tools: tools.iter().map(|t| t.name.clone()).collect(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ModelGatewayError::network("No mock reply queued")))
    }

    fn model_id(&self) -> &str {
        "mock-model"
    }
}

// ============================================================================
// Scripted Gateway
// ============================================================================

/// Stateless gateway whose reply depends only on the transcript, so it can
/// serve concurrent turns deterministically.
///
/// - Last turn is a tool response: answers `result: <json>`.
/// - Last user text is `tool:<name> <input>`: calls `<name>` with `{"input": <input>}`.
/// - Otherwise: answers `echo: <text>`.
pub struct ScriptedGateway;

#[async_trait]
impl ModelGateway for ScriptedGateway {
    async fn generate(
        &self,
        transcript: &[Turn],
        _tools: &[ToolDescriptor],
    ) -> Result<Turn, ModelGatewayError> {
        let Some(last) = transcript.last().and_then(Turn::first_part) else {
            return Err(ModelGatewayError::invalid_request("empty transcript"));
        };

        match last {
            Part::FunctionResponse(response) => Ok(Turn::model_text(format!("result: {}", response.result))),
            Part::Text(text) => match text.strip_prefix("tool:") {
                Some(rest) => {
                    let (name, input) = rest.split_once(' ').unwrap_or((rest, ""));
                    let mut args = Map::new();
                    args.insert("input".to_string(), json!(input));
                    Ok(Turn::function_call(name, args))
                }
                None => Ok(Turn::model_text(format!("echo: {text}"))),
            },
            Part::FunctionCall(_) => Err(ModelGatewayError::invalid_request("dangling function call")),
        }
    }

    fn model_id(&self) -> &str {
        "scripted-model"
    }
}

// ============================================================================
// Mock Tools
// ============================================================================

/// Tool with a canned outcome that records every execution
pub struct MockTool {
    name: String,
    schema: Value,
    output: Option<Result<Value, ToolError>>,
    executions: Mutex<Vec<Map<String, Value>>>,
}

#[allow(dead_code)]
impl MockTool {
    fn build(name: &str, output: Option<Result<Value, ToolError>>) -> Self {
        Self {
            name: name.to_string(),
            schema: json!({ "type": "object", "properties": {} }),
            output,
            executions: Mutex::new(Vec::new()),
        }
    }

    pub fn returning(name: &str, value: Value) -> Self {
        Self::build(name, Some(Ok(value)))
    }

    pub fn failing(name: &str, message: &str) -> Self {
        Self::build(name, Some(Err(ToolError::new(message))))
    }

    /// Returns its arguments as the result
    pub fn echoing(name: &str) -> Self {
        Self::build(name, None)
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = schema;
        self
    }

    pub fn recorded_executions(&self) -> Vec<Map<String, Value>> {
        self.executions.lock().unwrap().clone()
    }
}

#[async_trait]
impl Tool for MockTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> String {
        format!("Mock {}", self.name)
    }

    fn input_schema(&self) -> Value {
        self.schema.clone()
    }

    async fn run(&self, args: Map<String, Value>) -> Result<Value, ToolError> {
        self.executions.lock().unwrap().push(args.clone());
        match &self.output {
            Some(output) => output.clone(),
            None => Ok(Value::Object(args)),
        }
    }
}

/// Tool that panics when run
pub struct PanickingTool {
    name: String,
}

impl PanickingTool {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

#[async_trait]
impl Tool for PanickingTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> String {
        "Always panics".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({ "type": "object" })
    }

    async fn run(&self, _args: Map<String, Value>) -> Result<Value, ToolError> {
        panic!("{} exploded", self.name)
    }
}
