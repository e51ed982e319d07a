// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /predict HTTP handler

use crate::api::http_server::AppState;
use crate::api::predict::{PredictRequest, PredictResponse};
use crate::api::ApiError;
use axum::{body::Bytes, extract::State, Json};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// POST /predict handler
///
/// # Request Body
/// ```json
/// { "text": "red brick wall", "top_k": 2 }
/// ```
///
/// # Response Body
/// ```json
/// {
///   "predictions": [
///     { "label": "brick", "score": 0.91 },
///     { "label": "cement", "score": 0.05 }
///   ]
/// }
/// ```
pub async fn predict_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<PredictResponse>, ApiError> {
    let request = PredictRequest::from_body(&body).map_err(|e| {
        warn!(error = %e, "Rejected predict request");
        e
    })?;

    let top_k = request.top_k();
    let threshold = request.threshold();
    let predictions = state
        .adapter
        .run(move |adapter| adapter.predict(&request.text, top_k, threshold))
        .await
        .map_err(|e| {
            error!(error = %e, top_k, "Predict inference failed");
            ApiError::from(e)
        })?;

    debug!(top_k, returned = predictions.len(), "Predicted labels");
    Ok(Json(PredictResponse::from(predictions)))
}
