//! dialogue-web - browser chat with a pretrained DialoGPT model
//!
//! Serves a single chat page and a `/chat` endpoint that threads one shared
//! conversation through the model.

mod api;
mod chat;
mod config;
mod llm;

use api::{create_router, AppState};
use config::Config;
use llm::{DialoGpt, LanguageModel, LoggingModel};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    compression::CompressionLayer,
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
                .unwrap_or_else(|_| "dialogue_web=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = Config::from_env();

    // Load the model up front; nothing can be served without it
    tracing::info!(model = %config.model.id(), seeded = config.seed.is_some(), "Loading model");
    let source = config.model.clone();
    let seed = config.seed;
    let model = tokio::task::spawn_blocking(move || DialoGpt::load(&source, seed))
        .await?
        .map_err(|e| {
            tracing::error!(
                error = %e.message,
                kind = ?e.kind,
                fatal = e.kind.is_fatal(),
                "Model failed to load"
            );
            e
        })?;
    let model: Arc<dyn LanguageModel> = Arc::new(LoggingModel::new(Arc::new(model)));

    let state = AppState::new(model);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(compression);

    let listener = get_listener(&config).await?;
    tracing::info!("Chat server listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Reuse a socket handed over by `systemfd` (auto-reload during development),
/// otherwise bind the configured address.
async fn get_listener(config: &Config) -> std::io::Result<TcpListener> {
    let mut fds = listenfd::ListenFd::from_env();
    if let Some(listener) = fds.take_tcp_listener(0)? {
        tracing::info!("Inherited listener from systemfd");
        listener.set_nonblocking(true)?;
        return TcpListener::from_std(listener);
    }
    TcpListener::bind(config.addr()).await
}
