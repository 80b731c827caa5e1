//! Muse proxy - forwards chat requests to Gemini
//!
//! Holds the provider API key so clients never see it.

use muse::api::{create_router, ProxyState};
use muse::config::ProxyConfig;
use muse::llm::GeminiService;
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "muse=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = ProxyConfig::from_env();

    let gemini = GeminiService::new(config.api_key, &config.model, &config.upstream_url)?;
    if gemini.has_api_key() {
        tracing::info!(model = %config.model, upstream = %config.upstream_url, "Gemini service initialized");
    } else {
        tracing::warn!("No API key configured. Set GEMINI_API_KEY; provider calls will fail.");
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(ProxyState::new(gemini)).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    );

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Muse proxy listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
