// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod body;
pub mod errors;
pub mod http_server;
pub mod inference;
pub mod predict;
pub mod vectorize;

pub use errors::{ApiError, ErrorResponse};
pub use http_server::{create_app, serve, start_server, AppState, HealthResponse};
pub use inference::{InferenceAdapter, DEFAULT_LABEL_PREFIX};
pub use predict::{predict_handler, LabelScore, PredictRequest, PredictResponse};
pub use vectorize::{vectorize_handler, VectorizeRequest, VectorizeResponse};
