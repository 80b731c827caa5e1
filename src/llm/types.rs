//! Wire types for the Gemini `generateContent` API
//!
//! The same body travels client → proxy → provider, so these types are used on
//! both sides of the proxy.

use serde::{Deserialize, Serialize};

/// Reply used when the provider answered without any usable content
pub const FALLBACK_REPLY: &str = "Sorry, I couldn't get a response from Muse.";

/// Request body for `generateContent`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
    #[serde(default)]
    pub generation_config: GenerationConfig,
}

/// Generation parameters. Always sent as `{}`; unknown fields from callers are
/// dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {}

/// One conversation turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn new(role: &str, parts: Vec<Part>) -> Self {
        Self {
            role: Some(role.to_string()),
            parts,
        }
    }

    pub fn user(parts: Vec<Part>) -> Self {
        Self::new("user", parts)
    }

    pub fn is_user(&self) -> bool {
        self.role.as_deref() == Some("user")
    }
}

/// A single part of a turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    /// Anything else the provider may send back (function calls, thoughts, ...)
    Other(serde_json::Value),
}

impl Part {
    pub fn text(s: impl Into<String>) -> Self {
        Part::Text { text: s.into() }
    }

    pub fn inline(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Part::InlineData {
            inline_data: InlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            },
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// Base64 payload with its declared media type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// Response body for `generateContent`. Every field is optional so that
/// partial or error-only bodies still parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Provider-reported error payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl GenerateResponse {
    /// A response carrying a single text candidate
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(Content::new("model", vec![Part::text(text)])),
                finish_reason: Some("STOP".to_string()),
            }],
            error: None,
        }
    }

    /// A response carrying only an error payload
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            candidates: vec![],
            error: Some(ApiError {
                message: message.into(),
                code: None,
                status: None,
            }),
        }
    }

    /// Text of the first part of the first candidate, if it is non-empty text
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .as_text()
            .filter(|t| !t.is_empty())
    }

    /// Reduce the response to the text shown to the user
    pub fn into_reply(self) -> Reply {
        if let Some(text) = self.first_text() {
            return Reply {
                text: text.to_string(),
                kind: ReplyKind::Answer,
            };
        }
        match self.error {
            Some(error) => Reply {
                text: format!("Error from API: {}", error.message),
                kind: ReplyKind::ProviderError,
            },
            None => Reply {
                text: FALLBACK_REPLY.to_string(),
                kind: ReplyKind::Fallback,
            },
        }
    }
}

/// Where a reply's text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    /// Taken from the first candidate
    Answer,
    /// The provider returned an error payload
    ProviderError,
    /// Nothing usable was present
    Fallback,
}

/// Fully received reply, ready to be revealed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub kind: ReplyKind,
}

impl Reply {
    pub fn answer(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: ReplyKind::Answer,
        }
    }
}
