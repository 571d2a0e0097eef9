//! Model gateway abstraction
//!
//! The turn controller talks to the model only through [`ModelGateway`].
//! Provider wire formats stay inside the implementations.

mod error;
mod gemini;

pub use error::{GatewayErrorKind, ModelGatewayError};
pub use gemini::GeminiGateway;

use crate::tools::ToolDescriptor;
use crate::transcript::Turn;
use async_trait::async_trait;
use std::sync::Arc;

/// Produces one model-authored turn for a transcript
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Ask the model for its next turn. An empty `tools` slice means no
    /// tool schemas are offered.
    async fn generate(
        &self,
        transcript: &[Turn],
        tools: &[ToolDescriptor],
    ) -> Result<Turn, ModelGatewayError>;

    /// Get the model ID
    fn model_id(&self) -> &str;

    /// Decision call: the model may answer directly or request a tool
    async fn decide(
        &self,
        transcript: &[Turn],
        tools: &[ToolDescriptor],
    ) -> Result<Turn, ModelGatewayError> {
        self.generate(transcript, tools).await
    }

    /// Synthesis call: no tools are offered, so the model has to answer
    async fn synthesize(&self, transcript: &[Turn]) -> Result<Turn, ModelGatewayError> {
        self.generate(transcript, &[]).await
    }
}

#[async_trait]
impl<T: ModelGateway + ?Sized> ModelGateway for Arc<T> {
    async fn generate(
        &self,
        transcript: &[Turn],
        tools: &[ToolDescriptor],
    ) -> Result<Turn, ModelGatewayError> {
        (**self).generate(transcript, tools).await
    }

    fn model_id(&self) -> &str {
        (**self).model_id()
    }
}

/// Logging wrapper for model gateways
pub struct LoggingGateway {
    inner: Arc<dyn ModelGateway>,
    model_id: String,
}

impl LoggingGateway {
    pub fn new(inner: Arc<dyn ModelGateway>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl ModelGateway for LoggingGateway {
    async fn generate(
        &self,
        transcript: &[Turn],
        tools: &[ToolDescriptor],
    ) -> Result<Turn, ModelGatewayError> {
        let call = if tools.is_empty() { "synthesis" } else { "decision" };
        let start = std::time::Instant::now();
        let result = self.inner.generate(transcript, tools).await;
        let duration = start.elapsed();

        match &result {
            Ok(turn) => {
                tracing::info!(
                    model = %self.model_id,
                    call,
                    duration_ms = %duration.as_millis(),
                    transcript_len = transcript.len(),
                    tools_offered = tools.len(),
                    first_part = turn.first_part().map_or("none", |p| p.kind()),
                    "Model call completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    call,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = ?e.kind,
                    retryable = e.kind.is_retryable(),
                    "Model call failed"
                );
            }
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
