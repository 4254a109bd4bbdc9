use std::env;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use deepsearch_backend::config::AppConfig;
use deepsearch_backend::state::AppState;
use deepsearch_backend::{logging, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    logging::init(&config.server.log_dir);
    tracing::info!("Configuration loaded: {}", config.summary());

    let state = AppState::initialize(config)?;

    // PORT=0 picks an ephemeral port, useful when another process manages us.
    let port = env::var("PORT")
        .ok()
        .and_then(|val| val.parse::<u16>().ok())
        .unwrap_or(state.config.server.port);
    let bind_addr = format!("{}:{}", state.config.server.host, port);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;
    tracing::info!("Listening on {}", addr);

    let app: Router = server::router::router(state);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
