// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Concurrent request tests
//!
//! Many requests share one model without locking. Each response must match
//! the text of its own request, whatever else is in flight.

use crate::common::fasttext_fixture::FixtureModel;
use crate::common::{post_json, BrokenModel, StubModel};
use axum::http::StatusCode;
use futures_util::future::join_all;
use product_nlp_node::api::{create_app, AppState, PredictResponse, VectorizeResponse};
use product_nlp_node::embeddings::{ModelHandle, TextModel};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_vectorize_requests_are_isolated() {
    let reference = StubModel::new(32);
    let app = create_app(Arc::new(AppState::with_model(ModelHandle::new(
        StubModel::new(32),
    ))));

    let requests = (0..128).map(|i| {
        let app = app.clone();
        tokio::spawn(async move {
            let text = format!("product {} red brick", i);
            let (status, body) =
                post_json(&app, "/vectorize", json!({ "text": text }).to_string()).await;
            (text, status, body)
        })
    });

    for result in join_all(requests).await {
        let (text, status, body) = result.expect("request task panicked");
        assert_eq!(status, StatusCode::OK);

        let response: VectorizeResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.vector, reference.expected_vector(&text), "{}", text);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_mixed_requests_on_fasttext_model() {
    let fixture = FixtureModel::materials();
    let dir = TempDir::new().unwrap();
    let path = fixture.write_to(dir.path(), "model.bin");
    let model = ModelHandle::load(&path, "__label__").unwrap();
    let expected_vector = model.embed("grey cement").unwrap();
    let app = create_app(Arc::new(AppState::with_model(model)));

    let requests = (0..100).map(|i| {
        let app = app.clone();
        tokio::spawn(async move {
            if i % 2 == 0 {
                let (status, body) =
                    post_json(&app, "/vectorize", r#"{"text": "grey cement"}"#).await;
                assert_eq!(status, StatusCode::OK);
                let response: VectorizeResponse = serde_json::from_value(body).unwrap();
                (Some(response.vector), None)
            } else {
                let (status, body) =
                    post_json(&app, "/predict", r#"{"text": "steel beam", "top_k": 1}"#).await;
                assert_eq!(status, StatusCode::OK);
                let response: PredictResponse = serde_json::from_value(body).unwrap();
                (None, Some(response.predictions[0].label.clone()))
            }
        })
    });

    for result in join_all(requests).await {
        match result.expect("request task panicked") {
            (Some(vector), _) => assert_eq!(vector, expected_vector),
            (_, Some(label)) => assert_eq!(label, "steel"),
            _ => unreachable!(),
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_failures_do_not_affect_other_requests() {
    let broken = create_app(Arc::new(AppState::with_model(ModelHandle::new(
        BrokenModel { panic: true },
    ))));
    let healthy = create_app(Arc::new(AppState::with_model(ModelHandle::new(
        StubModel::new(8),
    ))));

    let requests = (0..40).map(|i| {
        let app = if i % 2 == 0 { broken.clone() } else { healthy.clone() };
        tokio::spawn(async move {
            let (status, _) = post_json(&app, "/vectorize", r#"{"text": "brick"}"#).await;
            (i, status)
        })
    });

    for result in join_all(requests).await {
        let (i, status) = result.unwrap();
        let expected = if i % 2 == 0 {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::OK
        };
        assert_eq!(status, expected, "request {}", i);
    }
}
