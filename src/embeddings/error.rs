// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Error types for model loading and inference

use std::path::PathBuf;
use thiserror::Error;

/// Fatal error raised while loading a model at startup
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("Failed to read model file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Not a fastText model (bad magic number {0})")]
    BadMagic(i32),

    #[error("Unsupported fastText model version {0}")]
    UnsupportedVersion(i32),

    #[error("Quantized models are not supported")]
    Quantized,

    #[error("Malformed model file: {0}")]
    Malformed(String),
}

impl ModelLoadError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        ModelLoadError::Malformed(message.into())
    }
}

/// Per-request failure of the model to produce output for valid input
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InferenceError {
    #[error("Model is not supervised and cannot classify text")]
    NotSupervised,

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Model produced a non-finite value at position {0}")]
    NonFinite(usize),

    #[error("Model row {row} is out of range ({rows} rows)")]
    RowOutOfRange { row: usize, rows: usize },

    #[error("Inference task aborted: {0}")]
    Aborted(String),
}
