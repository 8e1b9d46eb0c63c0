//! Maps a free-text reply onto a canonical PHQ frequency score.
//!
//! The oracle is asked for strict JSON but frequently returns prose, fenced
//! code blocks, or partial documents. Mapping therefore runs in two tiers:
//! a strict JSON parse, then a lexical heuristic over the raw text. Neither
//! tier ever surfaces an error to the caller.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use super::oracle::TextOracle;
use super::prompts;

const MAPPING_TEMPERATURE: f32 = 0.0;
const MAPPING_MAX_TOKENS: u32 = 160;
const EXPLAIN_TRUNCATE_CHARS: usize = 300;

/// Self-harm phrases scanned (lowercased) when the oracle output is not
/// parseable JSON. Any hit forces the risk flag regardless of the score.
const SELF_HARM_PHRASES: [&str; 5] = [
    "suicid",
    "kill myself",
    "hurt myself",
    "self harm",
    "want to die",
];

/// Risk signal attached to a mapped answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskSignal {
    None,
    Suicidal,
}

impl RiskSignal {
    pub const fn is_suicidal(self) -> bool {
        matches!(self, Self::Suicidal)
    }
}

/// A single turn's reply mapped onto the 0..=3 scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappedAnswer {
    pub answer: u8,
    pub risk: RiskSignal,
    pub explain: String,
    pub raw: String,
}

impl MappedAnswer {
    /// Fixed answer used when the oracle round trip itself fails.
    fn oracle_unavailable() -> Self {
        Self {
            answer: 0,
            risk: RiskSignal::None,
            explain: "LLM mapping failed".to_string(),
            raw: String::new(),
        }
    }
}

/// Converts one reply into a [`MappedAnswer`] via the oracle.
pub struct ScoreMapper {
    oracle: Arc<dyn TextOracle>,
}

impl ScoreMapper {
    pub fn new(oracle: Arc<dyn TextOracle>) -> Self {
        Self { oracle }
    }

    /// Never fails: oracle errors and malformed output both degrade into
    /// deterministic defaults.
    pub async fn map(&self, question_text: &str, user_reply: &str) -> MappedAnswer {
        let prompt = prompts::mapping_prompt(question_text, user_reply);
        match self
            .oracle
            .complete(&prompt, MAPPING_TEMPERATURE, MAPPING_MAX_TOKENS)
            .await
        {
            Ok(raw) => interpret(raw.trim()),
            Err(err) => {
                warn!(error = %err, "score mapping oracle call failed");
                MappedAnswer::oracle_unavailable()
            }
        }
    }
}

/// Tier 1: strict JSON. Tier 2: first standalone digit plus keyword scan.
fn interpret(raw: &str) -> MappedAnswer {
    if let Some(mapped) = parse_structured(raw) {
        return mapped;
    }

    let answer = standalone_digit(raw).unwrap_or(0);
    let lowered = raw.to_lowercase();
    let risk = if SELF_HARM_PHRASES
        .iter()
        .any(|phrase| lowered.contains(phrase))
    {
        RiskSignal::Suicidal
    } else {
        RiskSignal::None
    };

    MappedAnswer {
        answer,
        risk,
        explain: flatten_truncated(raw, EXPLAIN_TRUNCATE_CHARS),
        raw: raw.to_string(),
    }
}

/// Accepts only a JSON object whose `answer` coerces to an integer; anything
/// else sends the caller to the heuristic tier.
fn parse_structured(raw: &str) -> Option<MappedAnswer> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object()?;

    let answer = match object.get("answer") {
        None => 0,
        Some(field) => coerce_integer(field)?,
    };
    let answer = answer.clamp(0, 3) as u8;

    let risk = match object.get("risk").and_then(Value::as_str) {
        Some("suicidal") => RiskSignal::Suicidal,
        _ => RiskSignal::None,
    };

    let explain = match object.get("explain") {
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };

    Some(MappedAnswer {
        answer,
        risk,
        explain,
        raw: raw.to_string(),
    })
}

/// Integer coercion: JSON integers pass through, floats truncate toward
/// zero, and numeric strings parse. Everything else is a coercion failure.
fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float.trunc() as i64)),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn standalone_digit(raw: &str) -> Option<u8> {
    static DIGIT_RE: OnceLock<Regex> = OnceLock::new();
    let re = DIGIT_RE.get_or_init(|| Regex::new(r"\b([0-3])\b").expect("valid digit pattern"));
    re.captures(raw)
        .and_then(|captures| captures.get(1))
        .and_then(|digit| digit.as_str().parse().ok())
}

fn flatten_truncated(raw: &str, limit: usize) -> String {
    raw.replace('\n', " ").chars().take(limit).collect()
}
