// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! VectorizeResponse type for POST /vectorize

use serde::{Deserialize, Serialize};

/// Response body for POST /vectorize
///
/// Floats are written in their shortest form that parses back to the same
/// `f32`, so consumers comparing vectors see exactly what the model produced.
///
/// # Example
/// ```json
/// { "vector": [0.123, -0.456, 0.0] }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorizeResponse {
    /// Sentence vector, length equal to the model dimension
    pub vector: Vec<f32>,
}

impl VectorizeResponse {
    pub fn dimension(&self) -> usize {
        self.vector.len()
    }
}

impl From<Vec<f32>> for VectorizeResponse {
    fn from(vector: Vec<f32>) -> Self {
        Self { vector }
    }
}
