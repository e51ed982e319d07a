// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! VectorizeRequest type for POST /vectorize

use crate::api::{body::parse_json_body, ApiError};
use serde::{Deserialize, Serialize};

/// Request body for POST /vectorize
///
/// # Example
/// ```json
/// { "text": "red brick wall" }
/// ```
///
/// An empty `text` is valid and yields the model's vector for empty input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorizeRequest {
    /// Text to embed
    pub text: String,
}

impl VectorizeRequest {
    /// Parses and validates a raw request body
    ///
    /// # Errors
    /// `ApiError::InvalidRequest` for malformed JSON, a non-object body, or
    /// a missing or non-string `text` field.
    pub fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        parse_json_body(body)
    }
}
