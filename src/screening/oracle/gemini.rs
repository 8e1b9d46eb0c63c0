use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{OracleError, TextOracle};
use crate::config::OracleConfig;

/// REST client for the Gemini `generateContent` endpoint.
///
/// Holds no per-request state; the configured timeout bounds every round
/// trip so a hung oracle degrades into the callers' fallback paths.
pub struct GeminiOracle {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiOracle {
    pub fn new(config: &OracleConfig, api_key: String) -> Result<Self, OracleError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl TextOracle for GeminiOracle {
    async fn complete(
        &self,
        prompt: &str,
        temperature: f32,
        max_output_tokens: u32,
    ) -> Result<String, OracleError> {
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": temperature,
                "maxOutputTokens": max_output_tokens,
            },
        });

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(OracleError::Status {
                status: response.status().as_u16(),
            });
        }

        let payload: GenerateContentResponse = response.json().await?;
        let text = payload.text();
        if text.trim().is_empty() {
            return Err(OracleError::Empty);
        }
        Ok(text)
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .map(|part| part.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_text_joins_all_parts_of_the_first_candidate() {
        let payload: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"{\"answer\""},{"text":": 2}"}]}}]}"#,
        )
        .expect("well-formed candidate payload parses");
        assert_eq!(payload.text(), "{\"answer\": 2}");
    }

    #[test]
    fn response_without_candidates_yields_empty_text() {
        let payload: GenerateContentResponse =
            serde_json::from_str(r#"{}"#).expect("empty payload parses");
        assert_eq!(payload.text(), "");
    }
}
