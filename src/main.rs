// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use product_nlp_node::{
    api::{start_server, AppState},
    config::NodeConfig,
    embeddings::ModelHandle,
    version,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    // Initialize tracing subscriber for logging, defaulting to info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = NodeConfig::parse();

    info!("[ABM Tech Present: NLP For Products Matching]");
    info!("{}", version::get_version_string());

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        std::process::exit(2);
    }

    // The model must be fully loaded before the listener is bound; a
    // failed load means the node never serves.
    info!(path = %config.model_path.display(), "Loading AI model...");
    let model_path = config.model_path.clone();
    let label_prefix = config.label_prefix.clone();
    let loaded = tokio::task::spawn_blocking(move || ModelHandle::load(&model_path, &label_prefix))
        .await
        .context("Model loading task failed")?;

    let model = match loaded {
        Ok(model) => model,
        Err(e) => {
            error!("Error loading model: {}", e);
            std::process::exit(1);
        }
    };

    let summary = model.describe();
    info!(
        dimension = summary.dimension,
        supervised = summary.supervised,
        labels = summary.labels,
        loss = %summary.loss,
        "Model loaded"
    );

    let state = AppState::new(model, config.label_prefix.clone())
        .with_max_body_bytes(config.max_body_bytes);

    info!("Starting server on {}...", config.listen_addr());
    start_server(config.listen_addr(), Arc::new(state))
        .await
        .context("HTTP server failed")?;

    Ok(())
}
