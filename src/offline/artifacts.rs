//! Loading and validation of the classifier artifact bundle.
//!
//! The bundle is produced by the offline training pipeline and loaded once
//! at startup; any inconsistency is fatal so the service never runs with a
//! half-usable model.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

const CONFIG_FILE: &str = "config.json";
const VOCAB_FILE: &str = "vocab.json";
const WEIGHTS_FILE: &str = "weights.json";
const LABEL_MAP_FILE: &str = "label_map.json";

/// Shape and tokenization bounds, fixed at training time.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    pub num_labels: usize,
    pub max_len: usize,
    #[serde(default)]
    pub pad_id: usize,
    #[serde(default = "default_unk_id")]
    pub unk_id: usize,
}

const fn default_unk_id() -> usize {
    1
}

/// Linear layer parameters: one weight row per label over the vocabulary.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierWeights {
    pub weights: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
}

/// Everything needed to build the inference pipeline.
#[derive(Debug)]
pub struct ModelArtifacts {
    pub config: ClassifierConfig,
    pub vocab: HashMap<String, usize>,
    pub weights: ClassifierWeights,
    pub labels: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("model directory does not exist: {0}")]
    MissingDir(PathBuf),
    #[error("failed to read model artifact {path}: {source}")]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed model artifact {path}: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("inconsistent model artifacts: {0}")]
    Inconsistent(String),
}

impl ModelArtifacts {
    pub fn load(dir: &Path) -> Result<Self, ArtifactError> {
        if !dir.is_dir() {
            return Err(ArtifactError::MissingDir(dir.to_path_buf()));
        }

        let config: ClassifierConfig = read_json(&dir.join(CONFIG_FILE))?;
        let vocab: HashMap<String, usize> = read_json(&dir.join(VOCAB_FILE))?;
        let weights: ClassifierWeights = read_json(&dir.join(WEIGHTS_FILE))?;

        if config.num_labels == 0 || config.max_len == 0 {
            return Err(ArtifactError::Inconsistent(
                "config must declare at least one label and a positive max_len".to_string(),
            ));
        }
        if weights.weights.len() != config.num_labels {
            return Err(ArtifactError::Inconsistent(format!(
                "weight matrix has {} rows but config declares {} labels",
                weights.weights.len(),
                config.num_labels
            )));
        }
        if weights.bias.len() != config.num_labels {
            return Err(ArtifactError::Inconsistent(format!(
                "bias vector has {} entries but config declares {} labels",
                weights.bias.len(),
                config.num_labels
            )));
        }
        if let Some(row) = weights.weights.iter().find(|row| row.len() != vocab.len()) {
            return Err(ArtifactError::Inconsistent(format!(
                "weight row has width {} but the vocabulary has {} entries",
                row.len(),
                vocab.len()
            )));
        }
        // Token ids index weight columns directly, so the id space must be
        // dense: every id (including pad and unk) stays within the vocabulary.
        if let Some((token, &id)) = vocab.iter().find(|(_, &id)| id >= vocab.len()) {
            return Err(ArtifactError::Inconsistent(format!(
                "vocabulary token '{token}' has id {id} outside 0..{}",
                vocab.len()
            )));
        }
        if config.pad_id >= vocab.len() || config.unk_id >= vocab.len() {
            return Err(ArtifactError::Inconsistent(format!(
                "pad_id {} / unk_id {} fall outside the {}-entry vocabulary",
                config.pad_id,
                config.unk_id,
                vocab.len()
            )));
        }

        // The label map is optional; numeric names cover its absence.
        let label_map_path = dir.join(LABEL_MAP_FILE);
        let labels = if label_map_path.exists() {
            let labels: Vec<String> = read_json(&label_map_path)?;
            if labels.len() != config.num_labels {
                return Err(ArtifactError::Inconsistent(format!(
                    "label map has {} names but config declares {} labels",
                    labels.len(),
                    config.num_labels
                )));
            }
            labels
        } else {
            (0..config.num_labels)
                .map(|index| format!("label_{index}"))
                .collect()
        };

        Ok(Self {
            config,
            vocab,
            weights,
            labels,
        })
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let contents = fs::read_to_string(path).map_err(|source| ArtifactError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ArtifactError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}
