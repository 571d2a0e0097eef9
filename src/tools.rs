//! Tool registry and capability interface
//!
//! The registry is built once at startup from a fixed list of tools and is
//! read-only afterwards, so it can be shared freely between concurrent turns.

mod calendar;
mod papers;
pub mod schema;

pub use calendar::{AddCalendarEventTool, CalendarClient, FetchCalendarEventsTool};
pub use papers::SearchPapersTool;

use crate::config::ToolsConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Upper bound on any single outbound tool request
const TOOL_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client shared by the network-backed tools
fn http_client() -> Result<Client, reqwest::Error> {
    Client::builder().timeout(TOOL_HTTP_TIMEOUT).build()
}

/// Failure raised by a tool, as opposed to an `{"error": ...}` payload it
/// returns for the model to read
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ToolError {
    pub message: String,
}

impl ToolError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// What the model is told about a tool
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub argument_schema: Value,
}

/// A named capability the model may request
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name
    fn name(&self) -> &str;

    /// Tool description for the model
    fn description(&self) -> String;

    /// JSON schema for tool arguments
    fn input_schema(&self) -> Value;

    /// Execute the tool. Domain failures should come back as `Ok` with an
    /// `error` field; `Err` is for failures the tool cannot describe.
    async fn run(&self, args: Map<String, Value>) -> Result<Value, ToolError>;
}

/// Registered executable for a tool name
pub type CapabilityBinding = Arc<dyn Tool>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("tool '{0}' registered more than once")]
    DuplicateTool(String),
    #[error("failed to create tool HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Static collection of tools available to the model
pub struct ToolRegistry {
    tools: Vec<CapabilityBinding>,
    descriptors: Vec<ToolDescriptor>,
}

impl ToolRegistry {
    pub fn new(tools: Vec<CapabilityBinding>) -> Result<Self, RegistryError> {
        let mut descriptors: Vec<ToolDescriptor> = Vec::with_capacity(tools.len());
        for tool in &tools {
            if descriptors.iter().any(|d| d.name == tool.name()) {
                return Err(RegistryError::DuplicateTool(tool.name().to_string()));
            }
            descriptors.push(ToolDescriptor {
                name: tool.name().to_string(),
                description: tool.description(),
                argument_schema: tool.input_schema(),
            });
        }
        Ok(Self { tools, descriptors })
    }

    /// Create the standard tool set
    pub fn standard(config: &ToolsConfig) -> Result<Self, RegistryError> {
        let calendar = Arc::new(CalendarClient::new(&config.calendar)?);
        Self::new(vec![
            Arc::new(FetchCalendarEventsTool::new(calendar.clone())),
            Arc::new(AddCalendarEventTool::new(calendar)),
            Arc::new(SearchPapersTool::new(&config.papers)?),
        ])
    }

    /// Find the binding for a tool name. Unknown names are not an error here.
    pub fn lookup(&self, name: &str) -> Option<CapabilityBinding> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    /// Tool descriptors in registration order
    pub fn descriptors(&self) -> &[ToolDescriptor] {
        &self.descriptors
    }

    pub fn names(&self) -> Vec<&str> {
        self.descriptors.iter().map(|d| d.name.as_str()).collect()
    }
}
