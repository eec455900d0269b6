//! Gemini generation client and API key rotation.

use crate::error::GenerationError;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Anything that can turn a prompt into a reply. The pipeline depends on this
/// seam so tests can substitute a fake model.
#[async_trait::async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Round-robin rotation over an ordered list of API keys.
///
/// Advances once per generation call; call `i` (0-indexed) uses
/// `keys[i mod N]`.
pub struct KeyRotator {
    keys: Vec<String>,
    index: AtomicUsize,
}

impl KeyRotator {
    pub fn new(keys: Vec<String>) -> Self {
        assert!(!keys.is_empty(), "key list must not be empty");
        Self {
            keys,
            index: AtomicUsize::new(0),
        }
    }

    /// Select the next key in the cycle.
    pub fn next_key(&self) -> &str {
        let i = self.index.fetch_add(1, Ordering::Relaxed) % self.keys.len();
        &self.keys[i]
    }
}

/// Client for the Gemini `generateContent` REST endpoint.
pub struct GeminiClient {
    http: reqwest::Client,
    model: String,
    keys: KeyRotator,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, model: impl Into<String>, keys: Vec<String>) -> Self {
        Self {
            http,
            model: model.into(),
            keys: KeyRotator::new(keys),
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Deserialize, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[async_trait::async_trait]
impl ModelClient for GeminiClient {
    /// Send the prompt and return the first candidate's first part. No
    /// retries; a failure aborts the caller's turn.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let key = self.keys.next_key();
        let url = format!("{API_BASE}/models/{}:generateContent", self.model);
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(&url)
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or(GenerationError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_rotation_is_round_robin() {
        let rotator = KeyRotator::new(vec!["k0".into(), "k1".into(), "k2".into()]);
        let picked: Vec<&str> = (0..7).map(|_| rotator.next_key()).collect();
        assert_eq!(picked, vec!["k0", "k1", "k2", "k0", "k1", "k2", "k0"]);
    }

    #[test]
    fn test_single_key_rotation_always_returns_it() {
        let rotator = KeyRotator::new(vec!["only".into()]);
        assert_eq!(rotator.next_key(), "only");
        assert_eq!(rotator.next_key(), "only");
    }

    #[test]
    fn test_empty_response_body_parses_to_no_candidates() {
        let parsed: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.candidates.is_empty());
    }

    #[test]
    fn test_response_body_parses_first_candidate_text() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Hi there!"}]}}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.candidates[0].content.parts[0].text, "Hi there!");
    }
}
