// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Training arguments stored in the model header

use super::reader::BinaryReader;
use crate::embeddings::ModelLoadError;
use std::io::Read;

/// Loss function the output layer was trained with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossKind {
    HierarchicalSoftmax,
    NegativeSampling,
    Softmax,
    OneVsAll,
}

impl LossKind {
    fn from_raw(raw: i32) -> Result<Self, ModelLoadError> {
        match raw {
            1 => Ok(LossKind::HierarchicalSoftmax),
            2 => Ok(LossKind::NegativeSampling),
            3 => Ok(LossKind::Softmax),
            4 => Ok(LossKind::OneVsAll),
            other => Err(ModelLoadError::malformed(format!("unknown loss {}", other))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LossKind::HierarchicalSoftmax => "hs",
            LossKind::NegativeSampling => "ns",
            LossKind::Softmax => "softmax",
            LossKind::OneVsAll => "ova",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Cbow,
    SkipGram,
    Supervised,
}

impl ModelKind {
    fn from_raw(raw: i32) -> Result<Self, ModelLoadError> {
        match raw {
            1 => Ok(ModelKind::Cbow),
            2 => Ok(ModelKind::SkipGram),
            3 => Ok(ModelKind::Supervised),
            other => Err(ModelLoadError::malformed(format!("unknown model type {}", other))),
        }
    }
}

/// The subset of training arguments inference depends on. The remaining
/// header fields (window, epochs, ...) are read and discarded.
#[derive(Debug, Clone)]
pub struct Args {
    pub dim: usize,
    pub word_ngrams: usize,
    pub loss: LossKind,
    pub model: ModelKind,
    pub bucket: usize,
    pub minn: usize,
    pub maxn: usize,
}

impl Args {
    pub(crate) fn read<R: Read>(
        reader: &mut BinaryReader<R>,
        version: i32,
    ) -> Result<Self, ModelLoadError> {
        let dim = reader.read_i32()?;
        let _ws = reader.read_i32()?;
        let _epoch = reader.read_i32()?;
        let _min_count = reader.read_i32()?;
        let _neg = reader.read_i32()?;
        let word_ngrams = reader.read_i32()?;
        let loss = LossKind::from_raw(reader.read_i32()?)?;
        let model = ModelKind::from_raw(reader.read_i32()?)?;
        let bucket = reader.read_i32()?;
        let minn = reader.read_i32()?;
        let mut maxn = reader.read_i32()?;
        let _lr_update_rate = reader.read_i32()?;
        let _t = reader.read_f64()?;

        if dim <= 0 {
            return Err(ModelLoadError::malformed(format!(
                "dimension must be positive, got {}",
                dim
            )));
        }
        if word_ngrams < 0 || bucket < 0 || minn < 0 || maxn < 0 {
            return Err(ModelLoadError::malformed(
                "negative n-gram or bucket setting",
            ));
        }

        // Version 11 supervised models were trained without character n-grams
        if version == 11 && model == ModelKind::Supervised {
            maxn = 0;
        }

        Ok(Self {
            dim: dim as usize,
            word_ngrams: word_ngrams as usize,
            loss,
            model,
            bucket: bucket as usize,
            minn: minn as usize,
            maxn: maxn as usize,
        })
    }

    pub fn is_supervised(&self) -> bool {
        self.model == ModelKind::Supervised
    }
}
