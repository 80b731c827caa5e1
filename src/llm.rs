//! LLM provider abstraction
//!
//! `GeminiService` talks to Google directly and lives only in the proxy, which
//! holds the API key. `ProxyService` is what the chat client uses.

mod error;
mod gemini;
mod proxy;
mod types;

pub use error::{LlmError, LlmErrorKind};
pub use gemini::{GeminiService, UpstreamReply};
pub use proxy::{ProxyService, PROXY_ERROR_HEADER};
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for anything that can answer a `generateContent` request
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Make a completion request
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

#[async_trait]
impl<T: LlmService + ?Sized> LlmService for Arc<T> {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, LlmError> {
        (**self).generate(request).await
    }

    fn model_id(&self) -> &str {
        (**self).model_id()
    }
}

/// Logging wrapper for LLM services
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.generate(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    turns = request.contents.len(),
                    candidates = response.candidates.len(),
                    provider_error = response.error.is_some(),
                    "LLM request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = ?e.kind,
                    "LLM request failed"
                );
            }
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
