// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! PredictRequest type for POST /predict

use crate::api::{body::parse_json_body, ApiError};
use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Number of predictions returned when `top_k` is omitted
pub const DEFAULT_TOP_K: usize = 3;

/// Request body for POST /predict
///
/// # Fields
/// - `text`: Text to classify (may be empty)
/// - `top_k`: Maximum number of labels, a whole number of at least 1
///   (default: 3). Integral floats such as `3.0` are accepted and values
///   beyond the platform's `usize` saturate.
/// - `threshold`: Minimum probability in [0, 1] (default: 0.0)
///
/// # Example
/// ```json
/// { "text": "red brick wall", "top_k": 2 }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictRequest {
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<Number>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f32>,
}

impl PredictRequest {
    /// Parses and validates a raw request body
    pub fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        let request: Self = parse_json_body(body)?;
        request.validate()?;
        Ok(request)
    }

    /// Validates the request
    ///
    /// # Validation Rules
    /// 1. **top_k**: if present, must be a positive integer
    /// 2. **threshold**: if present, must lie within [0, 1]
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(k) = &self.top_k {
            if positive_count(k).is_none() {
                return Err(ApiError::validation(
                    "top_k",
                    format!("must be a positive integer (got {})", k),
                ));
            }
        }

        if let Some(t) = self.threshold {
            if !(0.0..=1.0).contains(&t) {
                return Err(ApiError::validation(
                    "threshold",
                    format!("must be between 0 and 1 (got {})", t),
                ));
            }
        }

        Ok(())
    }

    /// Requested number of labels, defaulting to [`DEFAULT_TOP_K`]
    pub fn top_k(&self) -> usize {
        self.top_k
            .as_ref()
            .and_then(positive_count)
            .unwrap_or(DEFAULT_TOP_K)
    }

    pub fn threshold(&self) -> f32 {
        self.threshold.unwrap_or(0.0)
    }
}

/// Value of a JSON number that is a whole number >= 1
fn positive_count(n: &Number) -> Option<usize> {
    if let Some(u) = n.as_u64() {
        return (u >= 1).then(|| usize::try_from(u).unwrap_or(usize::MAX));
    }
    if n.is_i64() {
        return None;
    }
    n.as_f64()
        .filter(|f| f.fract() == 0.0 && *f >= 1.0)
        .map(|f| f as usize)
}
