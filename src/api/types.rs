//! API request and response types

use crate::llm::{Content, Part};
use serde::{Deserialize, Serialize};

/// Request body of the simple chat endpoint
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Option<Vec<ChatTurn>>,
}

/// One prior turn in the simple chat format. Missing fields are tolerated.
#[derive(Debug, Deserialize)]
pub struct ChatTurn {
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl ChatTurn {
    /// Anything not sent by the user is treated as a model turn
    pub fn to_content(&self) -> Content {
        let role = if self.sender.as_deref() == Some("user") {
            "user"
        } else {
            "model"
        };
        Content::new(role, vec![Part::text(self.text.clone().unwrap_or_default())])
    }
}

/// Successful chat reply
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Flat error body: `{"error": "..."}`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Provider-shaped error body: `{"error": {"message": "..."}}`
#[derive(Debug, Serialize)]
pub struct ProviderErrorResponse {
    pub error: ProviderErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ProviderErrorBody {
    pub message: String,
}

impl ProviderErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: ProviderErrorBody {
                message: message.into(),
            },
        }
    }
}
