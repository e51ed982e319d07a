// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Bridge between validated requests and the shared model
//!
//! Calls the model exactly once per request, checks the output contract
//! and shapes it for the response encoder. Model calls run on the blocking
//! pool.

use crate::api::predict::LabelScore;
use crate::embeddings::{InferenceError, ModelHandle};
use std::sync::Arc;
use tracing::error;

/// Prefix fastText puts on label tokens during supervised training
pub const DEFAULT_LABEL_PREFIX: &str = "__label__";

#[derive(Debug, Clone)]
pub struct InferenceAdapter {
    model: ModelHandle,
    label_prefix: Arc<str>,
}

impl InferenceAdapter {
    pub fn new(model: ModelHandle, label_prefix: impl Into<String>) -> Self {
        Self {
            model,
            label_prefix: Arc::from(label_prefix.into()),
        }
    }

    pub fn model(&self) -> &ModelHandle {
        &self.model
    }

    pub fn label_prefix(&self) -> &str {
        &self.label_prefix
    }

    /// Sentence vector of `text`, exactly `dimension()` finite values long
    pub fn vectorize(&self, text: &str) -> Result<Vec<f32>, InferenceError> {
        let vector = self.model.embed(text)?;

        let expected = self.model.dimension();
        if vector.len() != expected {
            return Err(InferenceError::DimensionMismatch {
                expected,
                actual: vector.len(),
            });
        }
        if let Some(pos) = vector.iter().position(|v| !v.is_finite()) {
            return Err(InferenceError::NonFinite(pos));
        }
        Ok(vector)
    }

    /// Up to `top_k` labels in the model's own ranking, prefix stripped
    pub fn predict(
        &self,
        text: &str,
        top_k: usize,
        threshold: f32,
    ) -> Result<Vec<LabelScore>, InferenceError> {
        let mut predictions = self.model.classify(text, top_k, threshold)?;
        predictions.truncate(top_k);

        predictions
            .into_iter()
            .enumerate()
            .map(|(pos, p)| {
                if !p.score.is_finite() {
                    return Err(InferenceError::NonFinite(pos));
                }
                Ok(LabelScore {
                    label: self.strip_label_prefix(&p.label).to_string(),
                    score: p.score,
                })
            })
            .collect()
    }

    /// Removes the label prefix for presentation. Labels without the
    /// prefix pass through unchanged.
    pub fn strip_label_prefix<'a>(&self, label: &'a str) -> &'a str {
        label.strip_prefix(&*self.label_prefix).unwrap_or(label)
    }

    /// Runs `f` on the blocking pool. A panic inside `f` is contained to
    /// this call and surfaces as [`InferenceError::Aborted`].
    pub async fn run<T, F>(&self, f: F) -> Result<T, InferenceError>
    where
        F: FnOnce(&InferenceAdapter) -> Result<T, InferenceError> + Send + 'static,
        T: Send + 'static,
    {
        let adapter = self.clone();
        match tokio::task::spawn_blocking(move || f(&adapter)).await {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "Inference task failed");
                Err(InferenceError::Aborted(e.to_string()))
            }
        }
    }
}
