//! HTTP surface for the prediction pipeline.
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use tidecast_models::PredictionPipeline;

use crate::config::{ResponseShape, ServerConfig};

pub mod routes;

/// State shared by every handler. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<PredictionPipeline>,
    pub shape: ResponseShape,
}

impl AppState {
    pub fn new(pipeline: PredictionPipeline, shape: ResponseShape) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            shape,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    // Browser clients call the API directly.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health))
        .route("/seas", get(routes::seas))
        .route("/predict/:sea/:year", get(routes::predict))
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: &ServerConfig, state: AppState) -> Result<()> {
    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .with_context(|| format!("Invalid HOST:PORT configuration: {}", config.bind_address()))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    log::info!(
        "tidecast v{} listening on {} ({:?} mode, {:?} responses)",
        env!("CARGO_PKG_VERSION"),
        addr,
        config.mode,
        state.shape
    );

    axum::serve(listener, build_router(state))
        .await
        .context("Server terminated unexpectedly")
}
