//! Append-only CSV log of consented screening sessions.
//!
//! Rows are only ever written when the caller has explicitly consented;
//! nothing in the HTTP path touches this store.

use std::fs::OpenOptions;
use std::path::PathBuf;

use chrono::Utc;

use crate::offline::OfflineClassification;

const HEADER: [&str; 16] = [
    "timestamp", "age", "gender", "Q1", "Q2", "Q3", "Q4", "Q5", "Q6", "Q7", "Q8", "Q9",
    "pred_label", "pred_idx", "probs", "q9_flag",
];

/// One consented session: the raw answers plus the classification outcome.
#[derive(Debug)]
pub struct TranscriptRecord<'a> {
    pub age: &'a str,
    pub gender: &'a str,
    pub answers: &'a [String],
    pub classification: &'a OfflineClassification,
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    #[error("failed to open transcript log: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to write transcript row: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to serialize probabilities: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Writer for a single CSV file; the header is emitted once, when the file
/// is first created.
#[derive(Debug, Clone)]
pub struct TranscriptLog {
    path: PathBuf,
}

impl TranscriptLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn append(&self, record: &TranscriptRecord<'_>) -> Result<(), TranscriptError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let write_header = !self.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if write_header {
            writer.write_record(HEADER)?;
        }

        let classification = record.classification;
        let mut row = vec![
            Utc::now().to_rfc3339(),
            record.age.to_string(),
            record.gender.to_string(),
        ];
        row.extend(record.answers.iter().cloned());
        row.push(classification.label.clone());
        row.push(classification.label_idx.to_string());
        row.push(serde_json::to_string(&classification.probs)?);
        row.push(classification.q9_suicidal_flag.to_string());

        writer.write_record(&row)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offline::pipeline::RawModelOutput;

    fn classification() -> OfflineClassification {
        OfflineClassification {
            concat_text: String::new(),
            label_idx: 1,
            label: "moderate".to_string(),
            probs: vec![0.25, 0.75],
            topk: Vec::new(),
            q9_suicidal_flag: true,
            raw_model_output: RawModelOutput {
                logits: vec![0.0, 1.0],
                probs: vec![0.25, 0.75],
                pred_idx: 1,
                pred_label: "moderate".to_string(),
            },
        }
    }

    #[test]
    fn header_is_written_once_across_appends() {
        let dir = tempfile::tempdir().expect("temp dir");
        let log = TranscriptLog::new(dir.path().join("sessions.csv"));
        let answers: Vec<String> = (1..=9).map(|i| format!("answer {i}")).collect();
        let classification = classification();
        let record = TranscriptRecord {
            age: "29",
            gender: "f",
            answers: &answers,
            classification: &classification,
        };

        log.append(&record).expect("first append");
        log.append(&record).expect("second append");

        let contents = std::fs::read_to_string(log.path()).expect("read log");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("timestamp,age,gender,Q1"));
        assert!(lines[1].contains("moderate"));
        assert!(lines[1].contains("true"));
    }
}
