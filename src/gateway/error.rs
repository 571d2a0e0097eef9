//! Model gateway error types

use thiserror::Error;

/// Gateway failure with classification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ModelGatewayError {
    pub kind: GatewayErrorKind,
    pub message: String,
}

impl ModelGatewayError {
    pub fn new(kind: GatewayErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Network, message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::RateLimit, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::ServerError, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Auth, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::InvalidRequest, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::MalformedResponse, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Unknown, message)
    }

    /// Map a non-success HTTP status from a model API to an error
    pub fn from_status(status: u16, message: &str) -> Self {
        match status {
            400 => Self::invalid_request(format!("Invalid request: {message}")),
            401 | 403 => Self::auth(format!("Authentication failed: {message}")),
            429 => Self::rate_limit(format!("Rate limit exceeded: {message}")),
            500..=599 => Self::server_error(format!("Server error: {message}")),
            _ => Self::unknown(format!("HTTP {status}: {message}")),
        }
    }
}

/// Error classification
///
/// The router never retries; `is_retryable` is reported so callers can
/// decide for themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    /// Network issues, timeouts
    Network,
    /// Rate limited or quota exhausted (429)
    RateLimit,
    /// Server error (5xx)
    ServerError,
    /// Authentication failed (401, 403)
    Auth,
    /// Bad request (400)
    InvalidRequest,
    /// Reply could not be turned into a model turn
    MalformedResponse,
    Unknown,
}

impl GatewayErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::RateLimit | Self::ServerError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(
            ModelGatewayError::from_status(400, "bad").kind,
            GatewayErrorKind::InvalidRequest
        );
        assert_eq!(
            ModelGatewayError::from_status(403, "denied").kind,
            GatewayErrorKind::Auth
        );
        assert_eq!(
            ModelGatewayError::from_status(429, "quota").kind,
            GatewayErrorKind::RateLimit
        );
        assert_eq!(
            ModelGatewayError::from_status(503, "down").kind,
            GatewayErrorKind::ServerError
        );
        let other = ModelGatewayError::from_status(418, "teapot");
        assert_eq!(other.kind, GatewayErrorKind::Unknown);
        assert_eq!(other.message, "HTTP 418: teapot");
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(GatewayErrorKind::RateLimit.is_retryable());
        assert!(!GatewayErrorKind::Auth.is_retryable());
        assert!(!GatewayErrorKind::MalformedResponse.is_retryable());
    }
}
