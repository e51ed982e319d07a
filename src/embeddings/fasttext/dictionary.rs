// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Vocabulary, tokenization and subword hashing
//!
//! Row ids produced here index the input matrix: ids below `nwords` are
//! in-vocabulary words, ids from `nwords` upwards are hashed character
//! n-grams and word n-grams.

use super::args::Args;
use super::reader::BinaryReader;
use crate::embeddings::ModelLoadError;
use std::collections::HashMap;
use std::io::Read;

/// End-of-sentence token emitted for every newline
pub const EOS: &str = "</s>";
const BOW: &str = "<";
const EOW: &str = ">";

const WORD_NGRAM_MULTIPLIER: u64 = 116_049_371;

/// Smallest on-disk entry: empty token, NUL, i64 count and type byte
const MIN_ENTRY_BYTES: u64 = 1 + 8 + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Word,
    Label,
}

#[derive(Debug, Clone)]
struct Entry {
    word: String,
    count: i64,
    kind: EntryKind,
}

/// Tokens of one input line split into input rows and known labels
#[derive(Debug, Default)]
pub struct Line {
    pub rows: Vec<usize>,
    pub labels: Vec<usize>,
}

#[derive(Debug)]
pub struct Dictionary {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
    nwords: usize,
    nlabels: usize,
    prune_index: HashMap<i32, i32>,
    prune_index_size: i64,
    label_prefix: String,
    word_ngrams: usize,
    bucket: usize,
    minn: usize,
    maxn: usize,
}

/// 32-bit FNV-1a over sign-extended bytes, matching fastText's hash
pub fn hash(token: &str) -> u32 {
    let mut h: u32 = 2_166_136_261;
    for &b in token.as_bytes() {
        h ^= (b as i8) as u32;
        h = h.wrapping_mul(16_777_619);
    }
    h
}

fn is_delimiter(b: u8) -> bool {
    matches!(b, b' ' | b'\n' | b'\r' | b'\t' | 0x0b | 0x0c | 0)
}

/// Splits text the way fastText reads words from a stream: runs of
/// delimiters separate tokens and each newline becomes [`EOS`].
pub fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;

    for (i, &b) in text.as_bytes().iter().enumerate() {
        if is_delimiter(b) {
            if let Some(s) = start.take() {
                tokens.push(&text[s..i]);
            }
            if b == b'\n' {
                tokens.push(EOS);
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        tokens.push(&text[s..]);
    }
    tokens
}

impl Dictionary {
    pub(crate) fn read<R: Read>(
        reader: &mut BinaryReader<R>,
        args: &Args,
        label_prefix: &str,
    ) -> Result<Self, ModelLoadError> {
        let size = reader.read_i32()?;
        let nwords = reader.read_i32()?;
        let nlabels = reader.read_i32()?;
        let _ntokens = reader.read_i64()?;
        let prune_index_size = reader.read_i64()?;

        if size < 0 || nwords < 0 || nlabels < 0 || nwords as i64 + nlabels as i64 != size as i64 {
            return Err(ModelLoadError::malformed(format!(
                "inconsistent dictionary sizes (size {}, words {}, labels {})",
                size, nwords, nlabels
            )));
        }
        if size as u64 * MIN_ENTRY_BYTES > reader.remaining() {
            return Err(ModelLoadError::malformed(format!(
                "dictionary of {} entries does not fit in the remaining {} bytes",
                size,
                reader.remaining()
            )));
        }
        let (size, nwords, nlabels) = (size as usize, nwords as usize, nlabels as usize);

        let mut entries = Vec::with_capacity(size);
        let mut index = HashMap::with_capacity(size);
        for i in 0..size {
            let word = reader.read_cstring()?;
            let count = reader.read_i64()?;
            let kind = match reader.read_i8()? {
                0 => EntryKind::Word,
                1 => EntryKind::Label,
                other => {
                    return Err(ModelLoadError::malformed(format!(
                        "unknown entry type {} for '{}'",
                        other, word
                    )))
                }
            };

            let expected = if i < nwords {
                EntryKind::Word
            } else {
                EntryKind::Label
            };
            if kind != expected {
                return Err(ModelLoadError::malformed(format!(
                    "entry {} ('{}') is out of order: words must precede labels",
                    i, word
                )));
            }

            index.insert(word.clone(), i);
            entries.push(Entry { word, count, kind });
        }

        let mut prune_index = HashMap::new();
        for _ in 0..prune_index_size.max(0) {
            let from = reader.read_i32()?;
            let to = reader.read_i32()?;
            prune_index.insert(from, to);
        }

        Ok(Self {
            entries,
            index,
            nwords,
            nlabels,
            prune_index,
            prune_index_size,
            label_prefix: label_prefix.to_string(),
            word_ngrams: args.word_ngrams,
            bucket: args.bucket,
            minn: args.minn,
            maxn: args.maxn,
        })
    }

    pub fn nwords(&self) -> usize {
        self.nwords
    }

    pub fn nlabels(&self) -> usize {
        self.nlabels
    }

    pub fn get_id(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied()
    }

    fn kind_of(&self, token: &str, id: Option<usize>) -> EntryKind {
        match id {
            Some(id) => self.entries[id].kind,
            None if token.starts_with(&self.label_prefix) => EntryKind::Label,
            None => EntryKind::Word,
        }
    }

    /// Label text for a label index in `0..nlabels`
    pub fn label(&self, label: usize) -> &str {
        &self.entries[self.nwords + label].word
    }

    /// Label counts in label-index order, used to build the Huffman tree
    pub fn label_counts(&self) -> Vec<i64> {
        self.entries[self.nwords..]
            .iter()
            .filter(|e| e.kind == EntryKind::Label)
            .map(|e| e.count)
            .collect()
    }

    fn push_hash(&self, rows: &mut Vec<usize>, id: i64) {
        if self.prune_index_size == 0 || id < 0 {
            return;
        }
        let id = if self.prune_index_size > 0 {
            match self.prune_index.get(&(id as i32)) {
                Some(&mapped) if mapped >= 0 => mapped as i64,
                _ => return,
            }
        } else {
            id
        };
        rows.push(self.nwords + id as usize);
    }

    /// Character n-grams of `word`, which must already carry `<` and `>`.
    /// Continuation bytes of multi-byte UTF-8 characters never start an
    /// n-gram, and single-character n-grams at either boundary are skipped.
    fn compute_subwords(&self, word: &str, rows: &mut Vec<usize>) {
        if self.maxn == 0 || self.bucket == 0 {
            return;
        }
        let bytes = word.as_bytes();
        let is_continuation = |b: u8| (b & 0xC0) == 0x80;

        for i in 0..bytes.len() {
            if is_continuation(bytes[i]) {
                continue;
            }
            let mut j = i;
            let mut n = 1;
            while j < bytes.len() && n <= self.maxn {
                j += 1;
                while j < bytes.len() && is_continuation(bytes[j]) {
                    j += 1;
                }
                if n >= self.minn && !(n == 1 && (i == 0 || j == bytes.len())) {
                    let ngram = String::from_utf8_lossy(&bytes[i..j]);
                    let h = hash(&ngram) as usize % self.bucket;
                    self.push_hash(rows, h as i64);
                }
                n += 1;
            }
        }
    }

    /// Input rows for one token of a supervised line
    fn add_subwords(&self, rows: &mut Vec<usize>, token: &str, id: Option<usize>) {
        match id {
            None => {
                if token != EOS {
                    self.compute_subwords(&format!("{}{}{}", BOW, token, EOW), rows);
                }
            }
            Some(id) => {
                rows.push(id);
                if self.maxn > 0 && token != EOS {
                    self.compute_subwords(&format!("{}{}{}", BOW, token, EOW), rows);
                }
            }
        }
    }

    fn add_word_ngrams(&self, rows: &mut Vec<usize>, hashes: &[i32]) {
        if self.bucket == 0 {
            return;
        }
        for i in 0..hashes.len() {
            let mut h = hashes[i] as u64;
            for &next in hashes.iter().take(i + self.word_ngrams).skip(i + 1) {
                h = h
                    .wrapping_mul(WORD_NGRAM_MULTIPLIER)
                    .wrapping_add(next as u64);
                self.push_hash(rows, (h % self.bucket as u64) as i64);
            }
        }
    }

    /// Reads the first line of `text` into input rows and known labels.
    /// Only the text up to and including the first newline is considered.
    pub fn line(&self, text: &str) -> Line {
        let mut line = Line::default();
        let mut hashes: Vec<i32> = Vec::new();

        for token in tokenize(text) {
            let id = self.get_id(token);
            match self.kind_of(token, id) {
                EntryKind::Word => {
                    self.add_subwords(&mut line.rows, token, id);
                    hashes.push(hash(token) as i32);
                }
                EntryKind::Label => {
                    if let Some(id) = id {
                        line.labels.push(id - self.nwords);
                    }
                }
            }
            if token == EOS {
                break;
            }
        }

        self.add_word_ngrams(&mut line.rows, &hashes);
        line
    }

    /// Rows averaged to form the vector of a single word
    pub fn word_rows(&self, word: &str) -> Vec<usize> {
        let mut rows = Vec::new();
        if let Some(id) = self.get_id(word) {
            rows.push(id);
        }
        if word != EOS {
            self.compute_subwords(&format!("{}{}{}", BOW, word, EOW), &mut rows);
        }
        rows
    }
}
