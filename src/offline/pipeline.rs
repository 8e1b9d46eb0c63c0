//! The offline prediction pipeline: nine answers in, one classification out.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::artifacts::{ArtifactError, ModelArtifacts};
use super::classifier::{softmax, top_k, LinearClassifier};
use super::tokenizer::Tokenizer;

/// Joins the nine answers into the single training-format text blob.
/// Must match the delimiter used when the model was trained.
pub const ANSWER_DELIMITER: &str = " ||| ";

pub const ANSWER_COUNT: usize = 9;
pub const TOP_K_DEFAULT: usize = 5;

/// Lexical safety net over the self-harm item. Fires on pattern match
/// regardless of what the classifier predicts.
fn suicidal_keyword_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(kill myself|suicid(e|al)|end my life|want to die|hurt myself|cut myself|hang myself|better off dead)\b",
        )
        .expect("valid self-harm keyword pattern")
    })
}

/// One entry of the top-k ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopPrediction {
    pub index: usize,
    pub prob: f64,
    pub label: String,
}

/// Raw forward-pass outputs kept alongside the summarized result.
#[derive(Debug, Clone, Serialize)]
pub struct RawModelOutput {
    pub logits: Vec<f32>,
    pub probs: Vec<f64>,
    pub pred_idx: usize,
    pub pred_label: String,
}

/// Full classification of one nine-answer submission.
#[derive(Debug, Clone, Serialize)]
pub struct OfflineClassification {
    pub concat_text: String,
    pub label_idx: usize,
    pub label: String,
    pub probs: Vec<f64>,
    pub topk: Vec<TopPrediction>,
    pub q9_suicidal_flag: bool,
    pub raw_model_output: RawModelOutput,
}

/// Caller mistakes on the prediction boundary.
#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error("answers must have length {ANSWER_COUNT}. Got length {0}.")]
    WrongLength(usize),
}

/// Holds the tokenizer and classifier loaded once at startup; immutable
/// afterwards, so concurrent predictions need no synchronization.
#[derive(Debug)]
pub struct OfflinePipeline {
    tokenizer: Tokenizer,
    classifier: LinearClassifier,
    labels: Vec<String>,
}

impl OfflinePipeline {
    pub fn from_artifact_dir(dir: &Path) -> Result<Self, ArtifactError> {
        let artifacts = ModelArtifacts::load(dir)?;
        let tokenizer = Tokenizer::new(artifacts.vocab, &artifacts.config);
        let classifier = LinearClassifier::new(artifacts.weights);
        Ok(Self {
            tokenizer,
            classifier,
            labels: artifacts.labels,
        })
    }

    /// Classify nine free-text answers (Q1..Q9 order).
    ///
    /// Fewer than nine answers is a caller error unless `allow_short` pads
    /// the tail with empty strings; more than nine is always rejected.
    pub fn predict_from_answers(
        &self,
        answers: &[String],
        top_k: usize,
        allow_short: bool,
    ) -> Result<OfflineClassification, PredictError> {
        let mut answers: Vec<String> =
            answers.iter().map(|answer| answer.trim().to_string()).collect();
        if answers.len() != ANSWER_COUNT {
            if allow_short && answers.len() < ANSWER_COUNT {
                answers.resize(ANSWER_COUNT, String::new());
            } else {
                return Err(PredictError::WrongLength(answers.len()));
            }
        }

        let concat_text = answers.join(ANSWER_DELIMITER);
        let raw = self.classify(&concat_text);
        let q9_suicidal_flag = suicidal_keyword_regex().is_match(&answers[ANSWER_COUNT - 1]);

        Ok(OfflineClassification {
            concat_text,
            label_idx: raw.pred_idx,
            label: raw.pred_label.clone(),
            probs: raw.probs.clone(),
            topk: self.rank(&raw.probs, top_k),
            q9_suicidal_flag,
            raw_model_output: raw,
        })
    }

    /// Classify a single pre-concatenated text blob. No q9 safety flag, as
    /// the per-item structure is unknown.
    pub fn predict_text(&self, text: &str, top_k: usize) -> OfflineClassification {
        let raw = self.classify(text);
        OfflineClassification {
            concat_text: text.to_string(),
            label_idx: raw.pred_idx,
            label: raw.pred_label.clone(),
            probs: raw.probs.clone(),
            topk: self.rank(&raw.probs, top_k),
            q9_suicidal_flag: false,
            raw_model_output: raw,
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    fn classify(&self, text: &str) -> RawModelOutput {
        let encoding = self.tokenizer.encode(text);
        let logits = self.classifier.forward(&encoding);
        let probs = softmax(&logits);
        let pred_idx = top_k(&probs, 1)[0];
        RawModelOutput {
            logits,
            pred_label: self.labels[pred_idx].clone(),
            pred_idx,
            probs,
        }
    }

    fn rank(&self, probs: &[f64], k: usize) -> Vec<TopPrediction> {
        top_k(probs, k)
            .into_iter()
            .map(|index| TopPrediction {
                index,
                prob: probs[index],
                label: self.labels[index].clone(),
            })
            .collect()
    }
}
