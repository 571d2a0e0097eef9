//! Google Gemini gateway implementation

use super::{ModelGateway, ModelGatewayError};
use crate::config::GeminiConfig;
use crate::tools::ToolDescriptor;
use crate::transcript::{FunctionCall, Part, Role, Turn};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini `generateContent` transport
pub struct GeminiGateway {
    client: Client,
    api_key: Option<String>,
    url: String,
    model_id: String,
}

impl GeminiGateway {
    pub fn new(config: &GeminiConfig) -> Result<Self, ModelGatewayError> {
        let url = match config.gateway.as_deref() {
            // Proxy gateway handles authentication itself
            Some(gw) => format!(
                "{}/gemini/v1beta/models/{}:generateContent",
                gw.trim_end_matches('/'),
                config.model
            ),
            None => format!("{GEMINI_API_BASE}/models/{}:generateContent", config.model),
        };

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ModelGatewayError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            url,
            model_id: config.model.clone(),
        })
    }

    fn translate_request(transcript: &[Turn], tools: &[ToolDescriptor]) -> GeminiRequest {
        let contents = transcript
            .iter()
            .map(|turn| GeminiContent {
                role: Some(
                    match turn.role() {
                        Role::User | Role::Tool => "user",
                        Role::Model => "model",
                    }
                    .to_string(),
                ),
                parts: turn.parts().iter().map(translate_part).collect(),
            })
            .collect();

        let tools = if tools.is_empty() {
            None
        } else {
            Some(vec![GeminiTool {
                function_declarations: tools
                    .iter()
                    .map(|t| GeminiFunctionDeclaration {
                        name: t.name.clone(),
                        description: t.description.clone(),
                        parameters: t.argument_schema.clone(),
                    })
                    .collect(),
            }])
        };

        GeminiRequest { contents, tools }
    }

    fn normalize_response(resp: GeminiResponse) -> Result<Turn, ModelGatewayError> {
        if let Some(usage) = &resp.usage_metadata {
            tracing::debug!(
                input_tokens = usage.prompt_token_count,
                output_tokens = usage.candidates_token_count,
                "Gemini usage"
            );
        }

        let candidate = resp
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ModelGatewayError::malformed("No candidates in response"))?;

        let mut parts = Vec::new();
        for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
            match part {
                GeminiPart::Text { text } => {
                    if !text.is_empty() {
                        parts.push(Part::Text(text));
                    }
                }
                GeminiPart::FunctionCall {
                    function_call,
                    thought_signature,
                } => {
                    let args = match function_call.args {
                        Value::Object(map) => map,
                        Value::Null => Map::new(),
                        other => {
                            return Err(ModelGatewayError::malformed(format!(
                                "Function call '{}' has non-object args: {other}",
                                function_call.name
                            )))
                        }
                    };
                    parts.push(Part::FunctionCall(
                        FunctionCall::new(function_call.name, args).with_signature(thought_signature),
                    ));
                }
                GeminiPart::FunctionResponse { .. } => {
                    return Err(ModelGatewayError::malformed(
                        "Model candidate contained a function response",
                    ))
                }
                GeminiPart::Other(_) => {} // Ignore other part types
            }
        }

        if parts.is_empty() {
            return Err(ModelGatewayError::malformed(format!(
                "Candidate has no text or function call parts (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        Turn::new(Role::Model, parts).map_err(|e| ModelGatewayError::malformed(e.to_string()))
    }
}

fn translate_part(part: &Part) -> GeminiPart {
    match part {
        Part::Text(text) => GeminiPart::Text { text: text.clone() },
        Part::FunctionCall(call) => GeminiPart::FunctionCall {
            function_call: GeminiFunctionCall {
                name: call.name.clone(),
                args: Value::Object(call.args.clone()),
            },
            thought_signature: call.signature.clone(),
        },
        Part::FunctionResponse(response) => GeminiPart::FunctionResponse {
            function_response: GeminiFunctionResponse {
                name: response.name.clone(),
                response: json!({ "result": response.result }),
            },
        },
    }
}

#[async_trait]
impl ModelGateway for GeminiGateway {
    async fn generate(
        &self,
        transcript: &[Turn],
        tools: &[ToolDescriptor],
    ) -> Result<Turn, ModelGatewayError> {
        let gemini_request = Self::translate_request(transcript, tools);

        let mut request = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&gemini_request);
        if let Some(key) = &self.api_key {
            request = request.header("x-goog-api-key", key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ModelGatewayError::network(format!("Request timeout: {e}"))
            } else if e.is_connect() {
                ModelGatewayError::network(format!("Connection failed: {e}"))
            } else {
                ModelGatewayError::unknown(format!("Request failed: {e}"))
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ModelGatewayError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<GeminiErrorResponse>(&body)
                .map_or(body, |resp| resp.error.message);
            return Err(ModelGatewayError::from_status(status.as_u16(), &message));
        }

        let gemini_response: GeminiResponse = serde_json::from_str(&body).map_err(|e| {
            ModelGatewayError::malformed(format!("Failed to parse response: {e} - body: {body}"))
        })?;

        Self::normalize_response(gemini_response)
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// Gemini API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<GeminiTool>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    FunctionCall {
        #[serde(rename = "functionCall")]
        function_call: GeminiFunctionCall,
        #[serde(
            rename = "thoughtSignature",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        thought_signature: Option<String>,
    },
    FunctionResponse {
        #[serde(rename = "functionResponse")]
        function_response: GeminiFunctionResponse,
    },
    Other(Value),
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiFunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiFunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTool {
    function_declarations: Vec<GeminiFunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct GeminiFunctionDeclaration {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}
