// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Text model capability and the shared handle the HTTP layer reads
//!
//! The model is loaded exactly once at startup and wrapped in a
//! [`ModelHandle`]. Handles are cheap to clone and every clone points at
//! the same immutable model, so request handlers read it concurrently
//! without any locking.

pub mod error;
pub mod fasttext;

pub use error::{InferenceError, ModelLoadError};
pub use fasttext::FastTextModel;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// A label and its confidence as ranked by the model
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub score: f32,
}

/// Static description of a loaded model, reported by `/health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    /// Model family (e.g., "fasttext")
    pub format: String,
    /// Length of every vector returned by `embed`
    pub dimension: usize,
    /// Whether the model can classify
    pub supervised: bool,
    pub words: usize,
    pub labels: usize,
    /// Loss the output layer was trained with
    pub loss: String,
}

/// Read-only embedding and classification capability
///
/// Implementations must be pure: the same input always yields the same
/// output and no call mutates the model.
pub trait TextModel: Send + Sync {
    /// Fixed embedding dimensionality
    fn dimension(&self) -> usize;

    /// Sentence vector of `text`; empty text yields a defined vector
    fn embed(&self, text: &str) -> Result<Vec<f32>, InferenceError>;

    /// Up to `k` labels with probability at least `threshold`, ordered by
    /// descending score
    fn classify(
        &self,
        text: &str,
        k: usize,
        threshold: f32,
    ) -> Result<Vec<Prediction>, InferenceError>;

    fn describe(&self) -> ModelSummary;
}

/// Shared, immutable handle to the loaded model
#[derive(Clone)]
pub struct ModelHandle {
    model: Arc<dyn TextModel>,
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("dimension", &self.model.dimension())
            .finish_non_exhaustive()
    }
}

impl ModelHandle {
    /// Loads a fastText model from `path`.
    ///
    /// This is blocking file I/O; call it before the server starts, off the
    /// async executor.
    pub fn load(path: impl AsRef<Path>, label_prefix: &str) -> Result<Self, ModelLoadError> {
        FastTextModel::load(path, label_prefix).map(Self::new)
    }

    /// Wraps an already constructed model
    pub fn new(model: impl TextModel + 'static) -> Self {
        Self {
            model: Arc::new(model),
        }
    }

    pub fn dimension(&self) -> usize {
        self.model.dimension()
    }

    pub fn embed(&self, text: &str) -> Result<Vec<f32>, InferenceError> {
        self.model.embed(text)
    }

    pub fn classify(
        &self,
        text: &str,
        k: usize,
        threshold: f32,
    ) -> Result<Vec<Prediction>, InferenceError> {
        self.model.classify(text, k, threshold)
    }

    pub fn describe(&self) -> ModelSummary {
        self.model.describe()
    }
}
