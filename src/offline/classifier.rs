//! Bag-of-token-counts linear classifier with a numerically stable softmax.
//!
//! The weights are calibrated by the offline training pipeline; inference
//! here is a plain forward pass over immutable parameters.

use super::artifacts::ClassifierWeights;
use super::tokenizer::Encoding;

#[derive(Debug)]
pub struct LinearClassifier {
    weights: Vec<Vec<f32>>,
    bias: Vec<f32>,
}

impl LinearClassifier {
    pub fn new(weights: ClassifierWeights) -> Self {
        Self {
            weights: weights.weights,
            bias: weights.bias,
        }
    }

    pub fn num_labels(&self) -> usize {
        self.bias.len()
    }

    /// `logit[c] = bias[c] + Σ_t W[c][t]` over the encoding's real tokens.
    pub fn forward(&self, encoding: &Encoding) -> Vec<f32> {
        self.weights
            .iter()
            .zip(&self.bias)
            .map(|(row, bias)| {
                let sum: f32 = encoding.token_ids().iter().map(|&id| row[id]).sum();
                bias + sum
            })
            .collect()
    }
}

/// Max-subtracted softmax; a degenerate sum falls back to uniform so a
/// broken logit vector can never produce NaN probabilities downstream.
pub fn softmax(logits: &[f32]) -> Vec<f64> {
    let max = logits
        .iter()
        .map(|&logit| logit as f64)
        .fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits
        .iter()
        .map(|&logit| (logit as f64 - max).exp())
        .collect();
    let total: f64 = exps.iter().sum();

    if total == 0.0 || !total.is_finite() {
        return vec![1.0 / logits.len() as f64; logits.len()];
    }
    exps.iter().map(|exp| exp / total).collect()
}

/// The `k` highest-probability indices, descending; ties break toward the
/// lower index. `k` is clamped to the class count.
pub fn top_k(probs: &[f64], k: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..probs.len()).collect();
    indices.sort_by(|&a, &b| {
        probs[b]
            .partial_cmp(&probs[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });
    indices.truncate(k.min(probs.len()));
    indices
}
