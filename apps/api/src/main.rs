mod blocks;
mod config;
mod errors;
mod optimizer;
mod resume;
mod routes;
mod session;
mod state;
mod template;
mod text;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::optimizer::GeminiOptimizer;
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume editor API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize optimizer client
    let optimizer = GeminiOptimizer::new(&config.optimizer)?;
    if config.optimizer.api_key.is_none() {
        warn!("OPTIMIZER_API_KEY is not set; optimize requests will fail");
    }
    info!(
        "Optimizer client initialized (model: {}, routes: {})",
        config.optimizer.model,
        config.optimizer.proxy_urls.len().max(1)
    );

    let state = AppState {
        sessions: SessionStore::new(),
        optimizer: Arc::new(optimizer),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
