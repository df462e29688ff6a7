mod completion;
mod config;
mod error;
mod handlers;
mod metrics;
mod models;
mod prompt;
mod rate_limit;
mod state;

use axum::{
    Router,
    routing::{get, post},
};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::completion::OpenAiClient;
use crate::config::Args;
use crate::handlers::{chat_handler, health_handler, metrics_handler};
use crate::rate_limit::{RATE_LIMIT_MAX, RateLimiter};
use crate::state::AppState;

// creating the router with routes
pub(crate) fn router(state: Arc<AppState>) -> Router {
    // any origin is allowed, restrict this in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/chat", post(chat_handler))
        .route("/metrics", get(metrics_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // parse cli arguments
    let args = Args::parse();
    if args.api_key.is_none() {
        warn!("OPENAI_API_KEY is not set, completion calls will be rejected by the provider");
    }

    let completion =
        OpenAiClient::new(&args.base_url, args.api_key.clone(), args.request_timeout())?;
    let rate_limiter = RateLimiter::default();
    let window_seconds = rate_limiter.window().as_secs();
    let state = Arc::new(AppState::new(
        Arc::new(completion),
        rate_limiter,
        args.model.clone(),
    ));

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(%addr, "chat relay listening");
    info!(model = %args.model, base_url = %args.base_url, "forwarding to completion provider");
    info!(
        max_requests = RATE_LIMIT_MAX,
        window_seconds,
        "rate limit per client"
    );

    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}
