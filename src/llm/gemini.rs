//! Google Gemini provider implementation
//!
//! Only the proxy constructs this service; the API key never leaves it.

use super::types::{GenerateRequest, GenerateResponse};
use super::{LlmError, LlmService};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;

/// Raw provider answer, passed through the proxy untouched
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: Value,
}

/// Gemini service implementation
pub struct GeminiService {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    model_id: String,
}

impl GeminiService {
    /// `base_url` is the API host, e.g. `https://generativelanguage.googleapis.com`
    pub fn new(api_key: Option<String>, model: &str, base_url: &str) -> Result<Self, LlmError> {
        let endpoint = format!(
            "{}/v1beta/models/{model}:generateContent",
            base_url.trim_end_matches('/')
        );

        // No overall timeout: a call runs until it resolves or the caller drops it
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| LlmError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.filter(|k| !k.is_empty()),
            endpoint,
            model_id: model.to_string(),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Forward a request and return the provider's status and JSON body as-is
    pub async fn forward(&self, request: &GenerateRequest) -> Result<UpstreamReply, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| LlmError::auth("GEMINI_API_KEY is not configured on the proxy"))?;

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", api_key)])
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(LlmError::from_transport)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(LlmError::from_body)?;

        let body = serde_json::from_str(&body).unwrap_or_else(|_| {
            // Keep the client-facing contract: always JSON, errors under `error.message`
            json!({ "error": { "message": format!("HTTP {status}: {body}") } })
        });

        Ok(UpstreamReply { status, body })
    }
}

#[async_trait]
impl LlmService for GeminiService {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, LlmError> {
        let reply = self.forward(request).await?;
        serde_json::from_value(reply.body).map_err(|e| {
            LlmError::unknown(format!(
                "Failed to parse response (HTTP {}): {e}",
                reply.status
            ))
        })
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
