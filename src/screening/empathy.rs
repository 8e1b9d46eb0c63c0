//! Generates the reflective acknowledgment and the next question.
//!
//! One oracle round trip per turn, plus at most one more when the primary
//! output cannot be parsed. Every path terminates in deterministic text;
//! the caller never sees an error.

use std::sync::Arc;

use serde::Deserialize;
use tracing::warn;

use super::items::{ANSWER_HINTS, FREQUENCY_HINT};
use super::oracle::TextOracle;
use super::prompts;

const EMPATHY_TEMPERATURE: f32 = 0.6;
const EMPATHY_MAX_TOKENS: u32 = 220;
const REWRITE_TEMPERATURE: f32 = 0.7;
const REWRITE_MAX_TOKENS: u32 = 120;

/// Number of the user's own words mirrored back in the deterministic
/// soothing fallback.
const MIRROR_WORDS: usize = 12;

/// One turn's soothing reply and next question, plus the raw oracle output
/// for auditability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmpathyTurn {
    pub soothing: String,
    pub next_question: String,
    pub raw: String,
}

#[derive(Debug, Deserialize)]
struct EmpathyPayload {
    #[serde(default)]
    soothing: String,
    #[serde(default)]
    next_question: String,
}

pub struct EmpathyGenerator {
    oracle: Arc<dyn TextOracle>,
}

impl EmpathyGenerator {
    pub fn new(oracle: Arc<dyn TextOracle>) -> Self {
        Self { oracle }
    }

    pub async fn generate(&self, next_question_text: &str, user_reply: &str) -> EmpathyTurn {
        let prompt = prompts::empathy_prompt(next_question_text, user_reply);
        match self
            .oracle
            .complete(&prompt, EMPATHY_TEMPERATURE, EMPATHY_MAX_TOKENS)
            .await
        {
            Ok(output) => {
                let output = output.trim().to_string();
                match parse_payload(&output) {
                    Some(payload) => EmpathyTurn {
                        soothing: payload.soothing.trim().to_string(),
                        next_question: payload.next_question.trim().to_string(),
                        raw: output,
                    },
                    None => self.mirrored_fallback(next_question_text, user_reply, output).await,
                }
            }
            Err(err) => {
                warn!(error = %err, "empathy oracle call failed");
                EmpathyTurn {
                    soothing: "I hear you — thanks for sharing.".to_string(),
                    next_question: format!("{next_question_text} ({ANSWER_HINTS})"),
                    raw: String::new(),
                }
            }
        }
    }

    /// Mirror the user's own words, then try a secondary rewrite call for
    /// the question; the canonical text with a fixed hint is the floor.
    async fn mirrored_fallback(
        &self,
        next_question_text: &str,
        user_reply: &str,
        raw: String,
    ) -> EmpathyTurn {
        let mirror = user_reply
            .split_whitespace()
            .take(MIRROR_WORDS)
            .collect::<Vec<_>>()
            .join(" ");
        let soothing =
            format!("It sounds like {mirror}... — that must be really hard. Thanks for sharing.");

        let rewrite_prompt = prompts::casual_question_prompt(next_question_text);
        let next_question = match self
            .oracle
            .complete(&rewrite_prompt, REWRITE_TEMPERATURE, REWRITE_MAX_TOKENS)
            .await
        {
            Ok(question) => question.trim().to_string(),
            Err(err) => {
                warn!(error = %err, "casual question rewrite failed");
                format!("{next_question_text} ({FREQUENCY_HINT})")
            }
        };

        EmpathyTurn {
            soothing,
            next_question,
            raw,
        }
    }
}

/// Locate the first `{` and parse a strict JSON document from there.
/// Leading prose is tolerated; trailing prose is not.
fn parse_payload(output: &str) -> Option<EmpathyPayload> {
    let start = output.find('{')?;
    serde_json::from_str(&output[start..]).ok()
}
