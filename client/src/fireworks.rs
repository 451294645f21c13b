//! Fireworks chat-completions suggestion provider.
//!
//! Sends the accumulated prompt as a single user message, asks for several
//! independent choices and keeps the first word of each one. Rank order is
//! the order of the choices in the response. Calls block the session loop
//! until the model answers or `timeout_ms` elapses.

use crate::config::ClientConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use wordgrid_core::{ProviderError, SuggestionProvider};

/// Number of suggestions requested per prompt.
pub const SUGGESTIONS_PER_PROMPT: usize = 3;

#[derive(Debug, Clone, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    top_p: f32,
    top_k: u32,
    presence_penalty: f32,
    frequency_penalty: f32,
    temperature: f32,
    n: usize,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Suggestion provider backed by a Fireworks deployment.
pub struct FireworksProvider {
    http: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    top_k: u32,
    presence_penalty: f32,
    frequency_penalty: f32,
}

impl FireworksProvider {
    /// Build a provider from `config`, reading the API key from its environment variable.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ProviderError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ProviderError::NotConfigured(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key: config.api_key(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
            top_k: config.top_k,
            presence_penalty: config.presence_penalty,
            frequency_penalty: config.frequency_penalty,
        })
    }

    /// Override the API key (e.g. from a keychain instead of the environment).
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            top_p: self.top_p,
            top_k: self.top_k,
            presence_penalty: self.presence_penalty,
            frequency_penalty: self.frequency_penalty,
            temperature: self.temperature,
            n: SUGGESTIONS_PER_PROMPT,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        }
    }
}

impl SuggestionProvider for FireworksProvider {
    fn fetch_candidates(&self, prompt: &str) -> Result<Vec<String>, ProviderError> {
        let key = self.api_key.as_deref().ok_or_else(|| {
            ProviderError::NotConfigured("no API key; set the variable named by api_key_env".into())
        })?;

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(key)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&self.request_body(prompt))
            .send()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        if !status.is_success() {
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let words = parse_response(&body)?;
        debug!(count = words.len(), "fireworks suggestions");
        Ok(words)
    }
}

/// Extract ranked first words from a chat-completions response body.
pub fn parse_response(body: &str) -> Result<Vec<String>, ProviderError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;
    let contents: Vec<&str> = response
        .choices
        .iter()
        .filter_map(|c| c.message.content.as_deref())
        .collect();
    Ok(first_words(&contents, SUGGESTIONS_PER_PROMPT))
}

/// First word of each completion, surrounding punctuation trimmed,
/// duplicates dropped, at most `limit` entries.
pub fn first_words(contents: &[&str], limit: usize) -> Vec<String> {
    let mut words: Vec<String> = Vec::with_capacity(limit);
    for content in contents {
        let Some(token) = content.split_whitespace().next() else {
            continue;
        };
        let word = token.trim_matches(|c: char| !c.is_alphanumeric());
        if word.is_empty() || words.iter().any(|w| w == word) {
            continue;
        }
        words.push(word.to_string());
        if words.len() == limit {
            break;
        }
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_words_trims_and_dedupes() {
        let words = first_words(&["  Light, and more", "\"break\" the", "light again", "glow."], 3);
        assert_eq!(words, vec!["Light", "break", "light"]);

        let words = first_words(&["...", "", "rust-belt city"], 3);
        assert_eq!(words, vec!["rust-belt"]);
    }

    #[test]
    fn test_first_words_respects_limit() {
        let words = first_words(&["a", "b", "c", "d"], 2);
        assert_eq!(words, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_response() {
        let body = r#"{
            "id": "cmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "light spills"}},
                {"index": 1, "message": {"role": "assistant", "content": "Break!"}},
                {"index": 2, "message": {"role": "assistant", "content": null}}
            ]
        }"#;
        assert_eq!(parse_response(body).unwrap(), vec!["light", "Break"]);
    }

    #[test]
    fn test_parse_response_rejects_garbage() {
        assert!(matches!(
            parse_response("<html>oops</html>"),
            Err(ProviderError::Parse(_))
        ));
        assert!(parse_response("{}").unwrap().is_empty());
    }

    #[test]
    fn test_request_body_shape() {
        let config = ClientConfig::default();
        let provider = FireworksProvider::from_config(&config).unwrap();
        let body = serde_json::to_value(provider.request_body("Write: dawn")).unwrap();

        assert_eq!(body["model"], config.model.as_str());
        assert_eq!(body["n"], 3);
        assert_eq!(body["top_k"], 40);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Write: dawn");
    }

    #[test]
    fn test_missing_key_is_not_configured() {
        let config = ClientConfig {
            api_key_env: "WORDGRID_TEST_KEY_UNSET_51AB".into(),
            ..ClientConfig::default()
        };
        let provider = FireworksProvider::from_config(&config).unwrap();
        assert!(!provider.has_api_key());
        assert!(matches!(
            provider.fetch_candidates("dawn"),
            Err(ProviderError::NotConfigured(_))
        ));
    }

    // Real network tests require FIREWORKS_API_KEY
    #[test]
    #[ignore]
    fn test_fetch_real_network() {
        let provider = FireworksProvider::from_config(&ClientConfig::default()).unwrap();
        let words = provider
            .fetch_candidates("Write me an Avant-Garde manifesto.\n\nWe")
            .unwrap();
        println!("Fireworks suggestions: {:?}", words);
        assert!(words.len() <= SUGGESTIONS_PER_PROMPT);
    }
}
