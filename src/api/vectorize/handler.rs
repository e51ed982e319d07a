// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /vectorize HTTP handler

use crate::api::http_server::AppState;
use crate::api::vectorize::{VectorizeRequest, VectorizeResponse};
use crate::api::ApiError;
use axum::{body::Bytes, extract::State, Json};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// POST /vectorize handler
///
/// # Request Body
/// ```json
/// { "text": "red brick wall" }
/// ```
///
/// # Response Body
/// ```json
/// { "vector": [0.1, 0.2, ...] }
/// ```
///
/// Returns 400 for malformed bodies and 500 if the model fails.
pub async fn vectorize_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<VectorizeResponse>, ApiError> {
    let request = VectorizeRequest::from_body(&body).map_err(|e| {
        warn!(error = %e, "Rejected vectorize request");
        e
    })?;

    let text_len = request.text.len();
    let vector = state
        .adapter
        .run(move |adapter| adapter.vectorize(&request.text))
        .await
        .map_err(|e| {
            error!(error = %e, text_len, "Vectorize inference failed");
            ApiError::from(e)
        })?;

    debug!(text_len, dimension = vector.len(), "Vectorized text");
    Ok(Json(VectorizeResponse::from(vector)))
}
