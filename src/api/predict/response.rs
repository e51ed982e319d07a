// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! PredictResponse and LabelScore types for POST /predict

use serde::{Deserialize, Serialize};

/// One ranked label
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabelScore {
    /// Label with the training prefix removed (e.g., "cement")
    pub label: String,

    /// Model confidence
    pub score: f32,
}

/// Response body for POST /predict
///
/// # Example
/// ```json
/// {
///   "predictions": [
///     { "label": "brick", "score": 0.91 },
///     { "label": "cement", "score": 0.05 }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictResponse {
    /// Labels ordered by descending score
    pub predictions: Vec<LabelScore>,
}

impl From<Vec<LabelScore>> for PredictResponse {
    fn from(predictions: Vec<LabelScore>) -> Self {
        Self { predictions }
    }
}
