//! HTTP API for the Muse proxy
//!
//! The proxy is the only process that knows the provider credential. Clients
//! send provider-shaped bodies and get the provider's answer back.

mod handlers;
mod types;

pub use handlers::create_router;
pub use types::*;

use crate::llm::{GeminiService, LlmService, LoggingService};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct ProxyState {
    /// Raw passthrough for `/api/generate`
    pub gemini: Arc<GeminiService>,
    /// Parsed calls for `/api/chat`
    pub llm: Arc<dyn LlmService>,
}

impl ProxyState {
    pub fn new(gemini: GeminiService) -> Self {
        let gemini = Arc::new(gemini);
        let llm: Arc<dyn LlmService> = Arc::new(LoggingService::new(gemini.clone()));
        Self { gemini, llm }
    }
}
