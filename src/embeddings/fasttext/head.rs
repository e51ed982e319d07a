// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Output layers turning a hidden vector into ranked label indices

use super::args::LossKind;
use crate::embeddings::InferenceError;
use ndarray::{Array1, Array2};

const MAX_SIGMOID: f32 = 8.0;
const SIGMOID_TABLE_SIZE: f32 = 512.0;

/// `log(x + 1e-5)`, the smoothed log fastText ranks with
pub fn std_log(x: f32) -> f32 {
    (x + 1e-5).ln()
}

/// Sigmoid quantized onto fastText's 512-entry lookup table, as the
/// one-vs-all and negative-sampling heads compute it.
pub fn sigmoid(x: f32) -> f32 {
    if x < -MAX_SIGMOID {
        0.0
    } else if x > MAX_SIGMOID {
        1.0
    } else {
        let i = ((x + MAX_SIGMOID) * SIGMOID_TABLE_SIZE / MAX_SIGMOID / 2.0) as i64;
        let grid = i as f32 * 2.0 * MAX_SIGMOID / SIGMOID_TABLE_SIZE - MAX_SIGMOID;
        1.0 / (1.0 + (-grid).exp())
    }
}

/// Exact logistic function, used when walking the Huffman tree
pub fn logistic(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Bounded list of `(log score, label)` kept in descending score order
struct TopK {
    k: usize,
    items: Vec<(f32, usize)>,
}

impl TopK {
    fn new(k: usize) -> Self {
        Self {
            k,
            items: Vec::with_capacity(k.min(64) + 1),
        }
    }

    /// Lowest retained score once the list is full
    fn floor(&self) -> Option<f32> {
        if self.items.len() == self.k {
            self.items.last().map(|(s, _)| *s)
        } else {
            None
        }
    }

    fn push(&mut self, score: f32, label: usize) {
        if self.k == 0 || matches!(self.floor(), Some(floor) if score < floor) {
            return;
        }
        let pos = self.items.partition_point(|(s, _)| *s >= score);
        self.items.insert(pos, (score, label));
        self.items.truncate(self.k);
    }

    fn into_vec(self) -> Vec<(f32, usize)> {
        self.items
    }
}

#[derive(Debug, Clone, Copy)]
struct Node {
    left: Option<usize>,
    right: Option<usize>,
    count: i64,
}

/// Huffman coding tree over labels for hierarchical softmax. Leaves are
/// label indices, internal node `i` uses output row `i - nlabels`.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    nlabels: usize,
}

impl HuffmanTree {
    /// Builds the tree from label counts sorted in descending order, as
    /// they are stored in the dictionary.
    pub fn build(counts: &[i64]) -> Self {
        let nlabels = counts.len();
        if nlabels == 0 {
            return Self {
                nodes: Vec::new(),
                nlabels,
            };
        }

        let mut nodes = vec![
            Node {
                left: None,
                right: None,
                count: 1_000_000_000_000_000,
            };
            2 * nlabels - 1
        ];
        for (node, &count) in nodes.iter_mut().zip(counts) {
            node.count = count;
        }

        // `leaf` walks the leaves from the rarest label, `next` walks the
        // internal nodes in creation order; both sequences are sorted.
        let mut leaf = nlabels as isize - 1;
        let mut next = nlabels;
        for i in nlabels..2 * nlabels - 1 {
            let mut pick = [0usize; 2];
            for slot in pick.iter_mut() {
                if leaf >= 0 && nodes[leaf as usize].count < nodes[next].count {
                    *slot = leaf as usize;
                    leaf -= 1;
                } else {
                    *slot = next;
                    next += 1;
                }
            }
            nodes[i].left = Some(pick[0]);
            nodes[i].right = Some(pick[1]);
            nodes[i].count = nodes[pick[0]].count + nodes[pick[1]].count;
        }

        Self { nodes, nlabels }
    }

    /// Number of output rows the tree reads from
    pub fn inner_nodes(&self) -> usize {
        self.nlabels.saturating_sub(1)
    }

    fn predict(
        &self,
        output: &Array2<f32>,
        hidden: &Array1<f32>,
        top: &mut TopK,
        threshold: f32,
    ) -> Result<(), InferenceError> {
        if self.nodes.is_empty() {
            return Ok(());
        }
        let min_score = std_log(threshold);
        let mut stack = vec![(self.nodes.len() - 1, 0.0f32)];

        while let Some((index, score)) = stack.pop() {
            if score < min_score {
                continue;
            }
            if matches!(top.floor(), Some(floor) if score < floor) {
                continue;
            }

            let node = self.nodes[index];
            let (left, right) = match (node.left, node.right) {
                (Some(left), Some(right)) => (left, right),
                _ => {
                    top.push(score, index);
                    continue;
                }
            };

            let row = index - self.nlabels;
            if row >= output.nrows() {
                return Err(InferenceError::RowOutOfRange {
                    row,
                    rows: output.nrows(),
                });
            }
            let f = logistic(output.row(row).dot(hidden));

            stack.push((right, score + std_log(f)));
            stack.push((left, score + std_log(1.0 - f)));
        }
        Ok(())
    }
}

/// Prediction layer selected by the training loss
#[derive(Debug, Clone)]
pub enum OutputHead {
    Softmax,
    Sigmoid,
    Hierarchical(HuffmanTree),
}

impl OutputHead {
    pub fn for_loss(loss: LossKind, label_counts: &[i64]) -> Self {
        match loss {
            LossKind::Softmax => OutputHead::Softmax,
            LossKind::NegativeSampling | LossKind::OneVsAll => OutputHead::Sigmoid,
            LossKind::HierarchicalSoftmax => {
                OutputHead::Hierarchical(HuffmanTree::build(label_counts))
            }
        }
    }

    /// Output rows this head needs for `nlabels` labels
    pub fn required_rows(&self, nlabels: usize) -> usize {
        match self {
            OutputHead::Softmax | OutputHead::Sigmoid => nlabels,
            OutputHead::Hierarchical(tree) => tree.inner_nodes(),
        }
    }

    /// Returns up to `k` `(log score, label)` pairs with probability at
    /// least `threshold`, best first.
    pub fn predict(
        &self,
        output: &Array2<f32>,
        hidden: &Array1<f32>,
        nlabels: usize,
        k: usize,
        threshold: f32,
    ) -> Result<Vec<(f32, usize)>, InferenceError> {
        let mut top = TopK::new(k);

        match self {
            OutputHead::Hierarchical(tree) => tree.predict(output, hidden, &mut top, threshold)?,
            OutputHead::Softmax | OutputHead::Sigmoid => {
                if output.nrows() < nlabels {
                    return Err(InferenceError::RowOutOfRange {
                        row: nlabels - 1,
                        rows: output.nrows(),
                    });
                }
                let logits = output.slice(ndarray::s![..nlabels, ..]).dot(hidden);
                let probs = match self {
                    OutputHead::Softmax => softmax(logits),
                    _ => logits.mapv(sigmoid),
                };
                for (label, &p) in probs.iter().enumerate() {
                    if p < threshold {
                        continue;
                    }
                    top.push(std_log(p), label);
                }
            }
        }

        Ok(top.into_vec())
    }
}

fn softmax(mut logits: Array1<f32>) -> Array1<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    logits.mapv_inplace(|x| (x - max).exp());
    let z: f32 = logits.sum();
    if z > 0.0 {
        logits.mapv_inplace(|x| x / z);
    }
    logits
}
