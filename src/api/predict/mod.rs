// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /predict: ranked category labels for a text

pub mod handler;
pub mod request;
pub mod response;

pub use handler::predict_handler;
pub use request::{PredictRequest, DEFAULT_TOP_K};
pub use response::{LabelScore, PredictResponse};
