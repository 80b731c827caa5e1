//! LLM error types

use thiserror::Error;

/// LLM error with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub message: String,
}

impl LlmError {
    pub fn new(kind: LlmErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Network, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Auth, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::InvalidRequest, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Unknown, message)
    }

    /// Classify a reqwest failure the same way for every provider.
    ///
    /// The URL is stripped from the message: upstream URLs carry the API key.
    pub fn from_transport(e: reqwest::Error) -> Self {
        let e = e.without_url();
        if e.is_timeout() {
            Self::network(format!("Request timeout: {e}"))
        } else if e.is_connect() {
            Self::network(format!("Connection failed: {e}"))
        } else if e.is_builder() {
            Self::invalid_request(format!("Invalid request: {e}"))
        } else {
            Self::network(format!("Request failed: {e}"))
        }
    }

    /// A failure while reading an already started response body
    pub fn from_body(e: reqwest::Error) -> Self {
        Self::network(format!("Failed to read response: {}", e.without_url()))
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Network issues, unreachable proxy or provider
    Network,
    /// No credential configured, or the provider rejected it
    Auth,
    /// Request could not be built or was rejected as malformed
    InvalidRequest,
    /// Unknown error
    Unknown,
}
