//! Client side of the Muse proxy
//!
//! Posts the provider-shaped body to `{proxy}/api/generate`. The proxy adds the
//! credential, so this service never sees one.

use super::types::{GenerateRequest, GenerateResponse};
use super::{LlmError, LlmService};
use async_trait::async_trait;
use reqwest::Client;

/// Set by the proxy on failures it produced itself (no key, provider
/// unreachable, bad body), as opposed to errors the provider returned.
pub const PROXY_ERROR_HEADER: &str = "x-muse-proxy-error";

pub struct ProxyService {
    client: Client,
    endpoint: String,
}

impl ProxyService {
    pub fn new(proxy_url: &str) -> Result<Self, LlmError> {
        let client = Client::builder()
            .build()
            .map_err(|e| LlmError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/api/generate", proxy_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl LlmService for ProxyService {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, LlmError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(LlmError::from_transport)?;

        let status = response.status();
        let proxy_failed = response.headers().contains_key(PROXY_ERROR_HEADER);
        let body = response
            .text()
            .await
            .map_err(LlmError::from_body)?;

        if proxy_failed {
            let message = serde_json::from_str::<GenerateResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .map(|e| e.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("HTTP {status}"));
            tracing::warn!(%status, error = %message, "Proxy could not complete the request");
            return Err(LlmError::network(message));
        }

        // Non-2xx bodies still carry `error.message`; anything unparseable is
        // treated as an empty answer and becomes the fallback reply.
        Ok(serde_json::from_str(&body).unwrap_or_else(|e| {
            tracing::warn!(%status, error = %e, "Unparseable response from proxy");
            GenerateResponse::default()
        }))
    }

    fn model_id(&self) -> &str {
        "muse-proxy"
    }
}
