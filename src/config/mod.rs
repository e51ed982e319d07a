// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Node configuration from command-line flags and environment variables

use crate::api::http_server::DEFAULT_MAX_BODY_BYTES;
use crate::api::DEFAULT_LABEL_PREFIX;
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("label prefix must not be empty")]
    EmptyLabelPrefix,

    #[error("max body size must be greater than 0")]
    ZeroBodyLimit,
}

/// Product NLP Node
#[derive(Parser, Debug, Clone)]
#[command(name = "product-nlp-node")]
#[command(version)]
#[command(about = "Serves fastText text vectors and label predictions over HTTP", long_about = None)]
pub struct NodeConfig {
    /// Path to the fastText .bin model
    #[arg(long, env = "MODEL_PATH", default_value = "osayebana_materials_model.bin")]
    pub model_path: PathBuf,

    /// Address to listen on
    #[arg(long, env = "API_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, env = "API_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Prefix marking label tokens; stripped from predicted labels
    #[arg(long, env = "LABEL_PREFIX", default_value = DEFAULT_LABEL_PREFIX)]
    pub label_prefix: String,

    /// Largest accepted request body in bytes
    #[arg(long, env = "MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,
}

impl NodeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.label_prefix.is_empty() {
            return Err(ConfigError::EmptyLabelPrefix);
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::ZeroBodyLimit);
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
