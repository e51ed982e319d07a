// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! fastText sentence vector and prediction tests
//!
//! Expected values are computed by hand from the fixture weights, which
//! are chosen so that averages and softmax rankings are easy to follow.

use crate::common::fasttext_fixture::{assert_close, mean, FixtureModel};
use product_nlp_node::embeddings::{FastTextModel, InferenceError, TextModel};
use tempfile::TempDir;

fn load(fixture: &FixtureModel) -> FastTextModel {
    let dir = TempDir::new().unwrap();
    let path = fixture.write_to(dir.path(), "model.bin");
    FastTextModel::load(&path, "__label__").expect("fixture should load")
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exp: Vec<f32> = logits.iter().map(|x| (x - max).exp()).collect();
    let z: f32 = exp.iter().sum();
    exp.iter().map(|e| e / z).collect()
}

fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn normalized(row: &[f32]) -> Vec<f32> {
    let norm = row.iter().map(|v| v * v).sum::<f32>().sqrt();
    row.iter().map(|v| v / norm).collect()
}

#[test]
fn test_supervised_vector_is_mean_of_word_rows() {
    let fixture = FixtureModel::materials();
    let model = load(&fixture);

    let vector = model.embed("red brick wall").unwrap();
    let expected = mean(&[
        fixture.word_row("red"),
        fixture.word_row("brick"),
        fixture.word_row("wall"),
    ]);

    assert_eq!(vector.len(), 4);
    assert_close(&vector, &expected);
    assert_close(&vector, &[4.0 / 3.0, 0.5 / 3.0, 0.0, 0.1 / 3.0]);
}

#[test]
fn test_empty_and_unknown_text_give_zero_vector() {
    let model = load(&FixtureModel::materials());

    assert_eq!(model.embed("").unwrap(), vec![0.0; 4]);
    assert_eq!(model.embed("   \t ").unwrap(), vec![0.0; 4]);
    assert_eq!(model.embed("plywood").unwrap(), vec![0.0; 4]);
}

#[test]
fn test_unknown_words_do_not_dilute_average() {
    let fixture = FixtureModel::materials();
    let model = load(&fixture);

    let with_noise = model.embed("plywood steel beam offcut").unwrap();
    let clean = model.embed("steel beam").unwrap();
    assert_close(&with_noise, &clean);
}

#[test]
fn test_only_first_line_is_read() {
    let fixture = FixtureModel::materials();
    let model = load(&fixture);

    let two_lines = model.embed("red brick\nsteel beam").unwrap();
    let first_line = model.embed("red brick\n").unwrap();
    assert_close(&two_lines, &first_line);

    // The newline itself contributes the end-of-sentence row
    let expected = mean(&[
        fixture.word_row("red"),
        fixture.word_row("brick"),
        fixture.word_row("</s>"),
    ]);
    assert_close(&first_line, &expected);
}

#[test]
fn test_embedding_is_deterministic() {
    let model = load(&FixtureModel::wide(64));
    let first = model.embed("grey cement powder").unwrap();
    for _ in 0..10 {
        assert_eq!(model.embed("grey cement powder").unwrap(), first);
    }
}

#[test]
fn test_word_bigrams_make_order_matter() {
    let fixture = FixtureModel::materials_bigrams(16);
    let model = load(&fixture);

    let forward = model.embed("red brick").unwrap();
    let backward = model.embed("brick red").unwrap();
    assert_ne!(forward, backward);

    // "red brick" hashes into bucket 14 of 16
    let bucket_row = &fixture.input[fixture.words.len() + 14];
    let expected = mean(&[
        fixture.word_row("red"),
        fixture.word_row("brick"),
        bucket_row.as_slice(),
    ]);
    assert_close(&forward, &expected);
}

#[test]
fn test_softmax_ranking_and_scores() {
    let model = load(&FixtureModel::materials());

    let predictions = model.classify("red brick wall", 2, 0.0).unwrap();
    assert_eq!(predictions.len(), 2);
    assert_eq!(predictions[0].label, "__label__brick");
    assert_eq!(predictions[1].label, "__label__cement");

    let probs = softmax(&[4.0 / 3.0, 0.5 / 3.0, 0.0]);
    assert!((predictions[0].score - (probs[0] + 1e-5)).abs() < 1e-4);
    assert!((predictions[1].score - (probs[1] + 1e-5)).abs() < 1e-4);
    assert!(predictions[0].score >= predictions[1].score);
}

#[test]
fn test_k_larger_than_label_count() {
    let model = load(&FixtureModel::materials());

    let predictions = model.classify("steel beam", 10, 0.0).unwrap();
    assert_eq!(predictions.len(), 3);
    assert_eq!(predictions[0].label, "__label__steel");
    assert!(predictions.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn test_threshold_filters_predictions() {
    let model = load(&FixtureModel::materials());

    let predictions = model.classify("red brick wall", 3, 0.5).unwrap();
    assert_eq!(predictions.len(), 1);
    assert_eq!(predictions[0].label, "__label__brick");

    assert!(model.classify("red brick wall", 3, 0.99).unwrap().is_empty());
}

#[test]
fn test_no_known_words_predicts_nothing() {
    let model = load(&FixtureModel::materials());

    assert!(model.classify("", 3, 0.0).unwrap().is_empty());
    assert!(model.classify("plywood", 3, 0.0).unwrap().is_empty());
    assert!(model.classify("red brick", 0, 0.0).unwrap().is_empty());
}

#[test]
fn test_hierarchical_softmax_predictions() {
    let model = load(&FixtureModel::materials_hs());

    let predictions = model.classify("red brick wall", 3, 0.0).unwrap();
    assert_eq!(predictions.len(), 3);
    assert!(predictions.windows(2).all(|w| w[0].score >= w[1].score));

    let total: f32 = predictions.iter().map(|p| p.score).sum();
    assert!((total - 1.0).abs() < 1e-3, "leaf probabilities sum to {}", total);

    let mut labels: Vec<_> = predictions.iter().map(|p| p.label.as_str()).collect();
    labels.sort_unstable();
    assert_eq!(
        labels,
        vec!["__label__brick", "__label__cement", "__label__steel"]
    );
}

#[test]
fn test_hierarchical_softmax_scores_match_exact_logistic() {
    // Logits that fall between points of the sigmoid lookup table
    let mut fixture = FixtureModel::materials_hs();
    fixture.output = vec![vec![0.37, 0.0, 0.0, 0.0], vec![0.21, 0.0, 0.0, 0.0]];
    let model = load(&fixture);

    // "red" has hidden vector [1, 0, 0, 0.1]; the root reads output row 1
    // and its left subtree (cement, steel) reads row 0.
    let root = logistic(0.21);
    let inner = logistic(0.37);
    let expected = [
        ("__label__brick", root + 1e-5),
        ("__label__cement", (1.0 - root + 1e-5) * (inner + 1e-5)),
        ("__label__steel", (1.0 - root + 1e-5) * (1.0 - inner + 1e-5)),
    ];

    let predictions = model.classify("red", 3, 0.0).unwrap();
    assert_eq!(predictions.len(), 3);
    for (prediction, (label, score)) in predictions.iter().zip(expected) {
        assert_eq!(prediction.label, label);
        assert!(
            (prediction.score as f64 - score).abs() < 1e-5,
            "{}: {} != {}",
            label,
            prediction.score,
            score
        );
    }
}

#[test]
fn test_unsupervised_model_cannot_classify() {
    let model = load(&FixtureModel::skipgram());
    assert_eq!(
        model.classify("red brick", 3, 0.0).unwrap_err(),
        InferenceError::NotSupervised
    );
}

#[test]
fn test_unsupervised_model_predicts_nothing_for_empty_text() {
    let model = load(&FixtureModel::skipgram());
    assert!(model.classify("", 3, 0.0).unwrap().is_empty());
    assert!(model.classify("plywood", 3, 0.0).unwrap().is_empty());
}

#[test]
fn test_unsupervised_vector_averages_normalized_words() {
    let fixture = FixtureModel::skipgram();
    let model = load(&fixture);

    let vector = model.embed("red brick").unwrap();
    let red = normalized(fixture.word_row("red"));
    let brick = normalized(fixture.word_row("brick"));
    assert_close(&vector, &mean(&[red.as_slice(), brick.as_slice()]));

    // Words without any row are skipped rather than counted as zero
    assert_close(&model.embed("red plywood brick").unwrap(), &vector);
    assert_eq!(model.embed("").unwrap(), vec![0.0; 4]);
}

#[test]
fn test_unsupervised_vector_reads_first_line_only() {
    let fixture = FixtureModel::skipgram();
    let model = load(&fixture);

    let first_line = model.embed("red").unwrap();
    assert_close(&first_line, &normalized(fixture.word_row("red")));
    assert_close(&model.embed("red\nsteel").unwrap(), &first_line);
    assert_close(
        &model.embed("red brick\nsteel beam\n").unwrap(),
        &model.embed("red brick").unwrap(),
    );
    assert_eq!(model.embed("\nsteel").unwrap(), vec![0.0; 4]);
}

#[test]
fn test_subwords_give_unknown_words_a_vector() {
    let model = load(&FixtureModel::skipgram_subwords(50));

    let vector = model.embed("bricks").unwrap();
    assert_eq!(vector.len(), 4);
    assert!(vector.iter().any(|v| *v != 0.0));
    assert!(vector.iter().all(|v| v.is_finite()));

    // Known words mix their own row with their n-grams
    let plain = load(&FixtureModel::skipgram()).embed("brick").unwrap();
    assert_ne!(model.embed("brick").unwrap(), plain);
}
