//! Process configuration
//!
//! Read once from the environment at startup and handed to the components
//! that need it.

use chrono_tz::Tz;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 300;
const GOOGLE_CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3";
const SEMANTIC_SCHOLAR_API: &str = "https://api.semanticscholar.org";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY not set (required unless LLM_GATEWAY is configured)")]
    MissingApiKey,
    #[error("invalid {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Top-level configuration
#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub gemini: GeminiConfig,
    pub tools: ToolsConfig,
}

/// Gemini gateway configuration
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    /// Proxy gateway base URL (e.g., `http://169.254.169.254/gateway/llm`)
    pub gateway: Option<String>,
    pub timeout: Duration,
}

/// Configuration for the shipped tools
#[derive(Clone)]
pub struct ToolsConfig {
    pub calendar: CalendarConfig,
    pub papers: PapersConfig,
}

#[derive(Clone)]
pub struct CalendarConfig {
    /// OAuth bearer access token with calendar scope
    pub access_token: Option<String>,
    pub calendar_id: String,
    pub timezone: Tz,
    pub base_url: String,
}

#[derive(Clone)]
pub struct PapersConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build configuration from an arbitrary variable source. Empty values
    /// count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let port = match get("AGENT_ROUTER_PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                var: "AGENT_ROUTER_PORT",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        let timeout_secs = match get("GEMINI_TIMEOUT_SECS") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                var: "GEMINI_TIMEOUT_SECS",
                value: raw,
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let gemini = GeminiConfig {
            api_key: get("GEMINI_API_KEY"),
            model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gateway: get("LLM_GATEWAY"),
            timeout: Duration::from_secs(timeout_secs),
        };
        if gemini.api_key.is_none() && gemini.gateway.is_none() {
            return Err(ConfigError::MissingApiKey);
        }

        let timezone = match get("CALENDAR_TIMEZONE") {
            Some(raw) => raw.parse::<Tz>().map_err(|_| ConfigError::Invalid {
                var: "CALENDAR_TIMEZONE",
                value: raw,
            })?,
            None => Tz::UTC,
        };

        let tools = ToolsConfig {
            calendar: CalendarConfig {
                access_token: get("GOOGLE_CALENDAR_TOKEN"),
                calendar_id: get("CALENDAR_ID").unwrap_or_else(|| "primary".to_string()),
                timezone,
                base_url: GOOGLE_CALENDAR_API.to_string(),
            },
            papers: PapersConfig {
                api_key: get("SEMANTIC_SCHOLAR_API_KEY"),
                base_url: SEMANTIC_SCHOLAR_API.to_string(),
            },
        };

        Ok(Self {
            port,
            gemini,
            tools,
        })
    }
}
