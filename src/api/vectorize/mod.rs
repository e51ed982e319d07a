// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /vectorize: text to sentence vector
//!
//! Used by the deduplication pipeline, which compares the returned
//! vectors for near-equality.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::vectorize_handler;
pub use request::VectorizeRequest;
pub use response::VectorizeResponse;
