// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! JSON body parsing shared by the request validators

use crate::api::ApiError;
use serde::de::DeserializeOwned;
use serde_json::error::Category;

/// Deserializes a raw request body, distinguishing malformed JSON from
/// well-formed JSON of the wrong shape. Both are client errors.
pub fn parse_json_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| match e.classify() {
        Category::Syntax | Category::Eof => {
            ApiError::InvalidRequest(format!("Invalid JSON: {}", e))
        }
        Category::Data | Category::Io => {
            ApiError::InvalidRequest(format!("Invalid request body: {}", e))
        }
    })
}
