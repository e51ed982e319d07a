// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! fastText model reader (binary format version 11-12)
//!
//! Loads the dense `.bin` models produced by `fasttext supervised` and
//! `fasttext skipgram|cbow` and answers sentence-vector and prediction
//! queries with the same arithmetic as the reference implementation.
//!
//! All state is read once in [`FastTextModel::load`] and never mutated, so
//! a single instance serves any number of concurrent readers.

mod args;
mod dictionary;
mod head;
mod reader;


use crate::embeddings::{InferenceError, ModelLoadError, ModelSummary, Prediction, TextModel};
use args::Args;
use dictionary::Dictionary;
use head::OutputHead;
use ndarray::{Array1, Array2};
use reader::BinaryReader;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info};

/// Magic number at the start of every fastText model file
pub const FASTTEXT_MAGIC: i32 = 793_712_314;
/// Newest file format version understood by this reader
pub const FASTTEXT_VERSION: i32 = 12;
const OLDEST_VERSION: i32 = 11;

/// A loaded fastText model
pub struct FastTextModel {
    args: Args,
    dict: Dictionary,
    input: Array2<f32>,
    output: Array2<f32>,
    head: OutputHead,
}

impl std::fmt::Debug for FastTextModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastTextModel")
            .field("dim", &self.args.dim)
            .field("model", &self.args.model)
            .field("loss", &self.args.loss)
            .field("nwords", &self.dict.nwords())
            .field("nlabels", &self.dict.nlabels())
            .finish_non_exhaustive()
    }
}

impl FastTextModel {
    /// Loads a model from disk.
    ///
    /// `label_prefix` decides which out-of-vocabulary tokens are treated as
    /// labels rather than words (fastText's `-label` training option).
    ///
    /// # Errors
    /// Returns [`ModelLoadError`] if the file cannot be read, is not a
    /// fastText model, uses an unsupported version, is quantized, or its
    /// sections are inconsistent with each other.
    pub fn load(path: impl AsRef<Path>, label_prefix: &str) -> Result<Self, ModelLoadError> {
        let path = path.as_ref();
        let io_err = |source| ModelLoadError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(io_err)?;
        let len = file.metadata().map_err(io_err)?.len();
        let mut reader = BinaryReader::new(BufReader::new(file), path, len);

        let magic = reader.read_i32()?;
        if magic != FASTTEXT_MAGIC {
            return Err(ModelLoadError::BadMagic(magic));
        }
        let version = reader.read_i32()?;
        if !(OLDEST_VERSION..=FASTTEXT_VERSION).contains(&version) {
            return Err(ModelLoadError::UnsupportedVersion(version));
        }

        let args = Args::read(&mut reader, version)?;
        let dict = Dictionary::read(&mut reader, &args, label_prefix)?;
        debug!(
            words = dict.nwords(),
            labels = dict.nlabels(),
            "Dictionary loaded"
        );

        if reader.read_bool()? {
            return Err(ModelLoadError::Quantized);
        }
        let input = reader.read_matrix()?;
        if reader.read_bool()? {
            return Err(ModelLoadError::Quantized);
        }
        let output = reader.read_matrix()?;

        let head = OutputHead::for_loss(args.loss, &dict.label_counts());
        let model = Self {
            args,
            dict,
            input,
            output,
            head,
        };
        model.validate()?;

        info!(
            path = %path.display(),
            dim = model.args.dim,
            supervised = model.args.is_supervised(),
            loss = model.args.loss.name(),
            "fastText model loaded"
        );
        Ok(model)
    }

    fn validate(&self) -> Result<(), ModelLoadError> {
        let dim = self.args.dim;
        if self.input.ncols() != dim {
            return Err(ModelLoadError::malformed(format!(
                "input matrix has {} columns, expected {}",
                self.input.ncols(),
                dim
            )));
        }
        if self.input.nrows() < self.dict.nwords() {
            return Err(ModelLoadError::malformed(format!(
                "input matrix has {} rows for {} words",
                self.input.nrows(),
                self.dict.nwords()
            )));
        }
        if self.output.ncols() != dim {
            return Err(ModelLoadError::malformed(format!(
                "output matrix has {} columns, expected {}",
                self.output.ncols(),
                dim
            )));
        }
        if self.args.is_supervised() {
            let required = self.head.required_rows(self.dict.nlabels());
            if self.output.nrows() < required {
                return Err(ModelLoadError::malformed(format!(
                    "output matrix has {} rows, {} loss over {} labels needs {}",
                    self.output.nrows(),
                    self.args.loss.name(),
                    self.dict.nlabels(),
                    required
                )));
            }
        }
        Ok(())
    }

    /// Mean of the given input rows; the zero vector when `rows` is empty
    fn average_rows(&self, rows: &[usize]) -> Result<Array1<f32>, InferenceError> {
        let mut acc = Array1::<f32>::zeros(self.args.dim);
        for &row in rows {
            if row >= self.input.nrows() {
                return Err(InferenceError::RowOutOfRange {
                    row,
                    rows: self.input.nrows(),
                });
            }
            acc += &self.input.row(row);
        }
        if !rows.is_empty() {
            acc *= (1.0 / rows.len() as f64) as f32;
        }
        Ok(acc)
    }

    /// Average of the L2-normalised vectors of each word on the first line
    fn unsupervised_sentence_vector(&self, text: &str) -> Result<Array1<f32>, InferenceError> {
        let mut sentence = Array1::<f32>::zeros(self.args.dim);
        let mut count = 0usize;

        let line = match text.find('\n') {
            Some(end) => &text[..end],
            None => text,
        };
        let words = line
            .split(|c: char| matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c'))
            .filter(|w| !w.is_empty());
        for word in words {
            let vector = self.average_rows(&self.dict.word_rows(word))?;
            let norm = vector.dot(&vector).sqrt();
            if norm > 0.0 {
                sentence.scaled_add(1.0 / norm, &vector);
                count += 1;
            }
        }

        if count > 0 {
            sentence *= (1.0 / count as f64) as f32;
        }
        Ok(sentence)
    }
}

impl TextModel for FastTextModel {
    fn dimension(&self) -> usize {
        self.args.dim
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, InferenceError> {
        let vector = if self.args.is_supervised() {
            let line = self.dict.line(text);
            self.average_rows(&line.rows)?
        } else {
            self.unsupervised_sentence_vector(text)?
        };
        Ok(vector.to_vec())
    }

    fn classify(
        &self,
        text: &str,
        k: usize,
        threshold: f32,
    ) -> Result<Vec<Prediction>, InferenceError> {
        let line = self.dict.line(text);
        if line.rows.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if !self.args.is_supervised() {
            return Err(InferenceError::NotSupervised);
        }

        let hidden = self.average_rows(&line.rows)?;
        let ranked = self
            .head
            .predict(&self.output, &hidden, self.dict.nlabels(), k, threshold)?;

        Ok(ranked
            .into_iter()
            .map(|(log_score, label)| Prediction {
                label: self.dict.label(label).to_string(),
                score: log_score.exp(),
            })
            .collect())
    }

    fn describe(&self) -> ModelSummary {
        ModelSummary {
            format: "fasttext".to_string(),
            dimension: self.args.dim,
            supervised: self.args.is_supervised(),
            words: self.dict.nwords(),
            labels: self.dict.nlabels(),
            loss: self.args.loss.name().to_string(),
        }
    }
}
