// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::{DefaultBodyLimit, State},
    http::{Method, Uri},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::{
    inference::{InferenceAdapter, DEFAULT_LABEL_PREFIX},
    predict_handler, vectorize_handler, ApiError,
};
use crate::embeddings::{ModelHandle, ModelSummary};

/// Default cap on request body size (1 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// State shared by all handlers. Holds no mutable data: the model handle
/// inside the adapter is read-only for the life of the process.
#[derive(Debug, Clone)]
pub struct AppState {
    pub adapter: InferenceAdapter,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(model: ModelHandle, label_prefix: impl Into<String>) -> Self {
        Self {
            adapter: InferenceAdapter::new(model, label_prefix),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// State with the default fastText label prefix
    pub fn with_model(model: ModelHandle) -> Self {
        Self::new(model, DEFAULT_LABEL_PREFIX)
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model: ModelSummary,
}

/// Builds the router: `POST /vectorize`, `POST /predict`, `GET /health`.
/// Any other path answers with a JSON 404.
pub fn create_app(state: Arc<AppState>) -> Router {
    let max_body_bytes = state.max_body_bytes;

    Router::new()
        .route("/vectorize", post(vectorize_handler))
        .route("/predict", post(predict_handler))
        .route("/health", get(health_handler))
        .fallback(not_found_handler)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves `state` on an already bound listener until `shutdown` resolves
pub async fn serve<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: F,
) -> std::io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let app = create_app(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

/// Binds `addr` and serves until Ctrl-C or SIGTERM
pub async fn start_server(addr: SocketAddr, state: Arc<AppState>) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("API server listening on {}", listener.local_addr()?);

    serve(listener, state, shutdown_signal()).await?;

    info!("API server stopped");
    Ok(())
}

async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::version::VERSION.to_string(),
        model: state.adapter.model().describe(),
    })
}

async fn not_found_handler(method: Method, uri: Uri) -> ApiError {
    ApiError::NotFound(format!("no route for {} {}", method, uri.path()))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
