//! Semantic Scholar paper search

use super::{http_client, Tool, ToolError};
use crate::config::PapersConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Map, Value};

const DEFAULT_LIMIT: u64 = 10;
const MAX_LIMIT: u64 = 100;
const DEFAULT_FIELDS: &str =
    "title,corpusId,abstract,tldr,year,referenceCount,citationCount,citationStyles,externalIds";

pub struct SearchPapersTool {
    client: Client,
    api_key: Option<String>,
    search_url: String,
}

impl SearchPapersTool {
    pub fn new(config: &PapersConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: http_client()?,
            api_key: config.api_key.clone(),
            search_url: format!(
                "{}/graph/v1/paper/search",
                config.base_url.trim_end_matches('/')
            ),
        })
    }
}

#[derive(Debug, PartialEq)]
struct SearchParams {
    query: String,
    limit: u64,
    offset: u64,
    fields: String,
}

impl SearchParams {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped non-negative
    fn from_args(args: &Map<String, Value>) -> Result<Self, String> {
        let query = args
            .get("query")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default();
        if query.is_empty() {
            return Err("Query parameter cannot be empty.".to_string());
        }

        let number = |key: &str| args.get(key).and_then(Value::as_f64).map(|n| n.max(0.0) as u64);

        Ok(Self {
            query: query.to_string(),
            limit: number("limit").unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            offset: number("offset").unwrap_or(0),
            fields: args
                .get("fields")
                .and_then(Value::as_str)
                .filter(|f| !f.trim().is_empty())
                .unwrap_or(DEFAULT_FIELDS)
                .to_string(),
        })
    }
}

/// Semantic Scholar reports throttling either with HTTP 429 or a `code` field
fn is_rate_limited(status: u16, body: &Value) -> bool {
    status == 429 || body.get("code").and_then(Value::as_str) == Some("429")
}

#[async_trait]
impl Tool for SearchPapersTool {
    fn name(&self) -> &str {
        "search_papers"
    }

    fn description(&self) -> String {
        "Searches the Semantic Scholar database for academic papers based on a query.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The query to search for (e.g., 'machine learning', 'climate change')."
                },
                "limit": {
                    "type": "integer",
                    "description": "The maximum number of paper results to return. Defaults to 10.",
                    "minimum": 1,
                    "maximum": MAX_LIMIT
                },
                "offset": {
                    "type": "integer",
                    "description": "The number of results to skip before starting to collect the result set. Defaults to 0.",
                    "minimum": 0
                },
                "fields": {
                    "type": "string",
                    "description": format!("Comma-separated list of fields to include in the results (e.g., 'title,abstract,year'). Defaults to '{DEFAULT_FIELDS}'.")
                }
            },
            "required": ["query"]
        })
    }

    async fn run(&self, args: Map<String, Value>) -> Result<Value, ToolError> {
        let params = match SearchParams::from_args(&args) {
            Ok(p) => p,
            Err(message) => return Ok(json!({ "error": message })),
        };

        tracing::debug!(query = %params.query, limit = params.limit, offset = params.offset, "Searching papers");

        let limit = params.limit.to_string();
        let offset = params.offset.to_string();
        let mut request = self.client.get(&self.search_url).query(&[
            ("query", params.query.as_str()),
            ("limit", limit.as_str()),
            ("offset", offset.as_str()),
            ("fields", params.fields.as_str()),
        ]);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => return Ok(json!({ "error": format!("Paper search request failed: {e}") })),
        };
        let status = response.status().as_u16();
        let body: Value = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                return Ok(json!({ "error": format!("Unreadable paper search response (HTTP {status}): {e}") }))
            }
        };

        if is_rate_limited(status, &body) {
            tracing::warn!(status, "Semantic Scholar rate limit exceeded");
            return Ok(body);
        }
        if !(200..300).contains(&status) {
            let message = body
                .get("message")
                .or_else(|| body.get("error"))
                .and_then(Value::as_str)
                .map_or_else(|| body.to_string(), str::to_string);
            return Ok(json!({ "error": format!("Paper search failed (HTTP {status}): {message}") }));
        }

        Ok(body)
    }
}
