use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::types::LlmClient;
use super::AiError;
use crate::config::ServiceConfig;

/// Safety categories relaxed for clinical text; symptom descriptions
/// otherwise trip the default filters.
const SAFETY_CATEGORIES: &[&str] = &[
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// Gemini `generateContent` client.
///
/// Blocking: construct and call it outside async contexts (the HTTP layer
/// goes through `spawn_blocking`).
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl GeminiClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, AiError> {
        if api_key.trim().is_empty() {
            return Err(AiError::MissingApiKey);
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AiError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.trim().to_string(),
            model: model.to_string(),
            client,
            timeout_secs: timeout.as_secs(),
        })
    }

    /// Client for the configured key, or `None` when no key is set.
    pub fn from_config(config: &ServiceConfig) -> Result<Option<Self>, AiError> {
        match config.gemini_api_key.as_deref() {
            Some(key) => Self::new(
                &config.gemini_base_url,
                key,
                &config.gemini_model,
                config.ai_timeout,
            )
            .map(Some),
            None => Ok(None),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    safety_settings: Vec<SafetySetting<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct SafetySetting<'a> {
    category: &'a str,
    threshold: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct GenerateResponse {
    candidates: Vec<ResponseCandidate>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate.
    fn first_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

impl LlmClient for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String, AiError> {
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            safety_settings: SAFETY_CATEGORIES
                .iter()
                .map(|&category| SafetySetting {
                    category,
                    threshold: "BLOCK_NONE",
                })
                .collect(),
            generation_config: GenerationConfig {
                temperature: 0.2,
                response_mime_type: "application/json",
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    AiError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    AiError::Timeout(self.timeout_secs)
                } else {
                    AiError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response.json().map_err(|e| {
            if e.is_timeout() {
                AiError::Timeout(self.timeout_secs)
            } else {
                AiError::ResponseParsing(e.to_string())
            }
        })?;

        parsed.first_text().ok_or(AiError::EmptyResponse)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

enum MockReply {
    Text(String),
    Status(u16),
    Timeout,
}

/// Mock LLM client for testing: returns a configurable reply and counts
/// calls.
pub struct MockLlmClient {
    reply: MockReply,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self::with_reply(MockReply::Text(response.to_string()))
    }

    /// Every call fails with the given HTTP status.
    pub fn failing(status: u16) -> Self {
        Self::with_reply(MockReply::Status(status))
    }

    /// Every call fails as a timeout.
    pub fn timing_out() -> Self {
        Self::with_reply(MockReply::Timeout)
    }

    fn with_reply(reply: MockReply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().ok().and_then(|p| p.clone())
    }
}

impl LlmClient for MockLlmClient {
    fn generate(&self, prompt: &str) -> Result<String, AiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_prompt.lock() {
            *last = Some(prompt.to_string());
        }
        match &self.reply {
            MockReply::Text(text) => Ok(text.clone()),
            MockReply::Status(status) => Err(AiError::Status {
                status: *status,
                body: "mock failure".into(),
            }),
            MockReply::Timeout => Err(AiError::Timeout(1)),
        }
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> GeminiClient {
        GeminiClient::new(base, "test-key", "gemini-2.0-flash", Duration::from_secs(3)).unwrap()
    }

    #[test]
    fn constructor_trims_trailing_slash() {
        let c = client("https://generativelanguage.googleapis.com/");
        assert_eq!(c.base_url, "https://generativelanguage.googleapis.com");
        assert_eq!(c.timeout_secs, 3);
        assert_eq!(c.model_name(), "gemini-2.0-flash");
    }

    #[test]
    fn endpoint_includes_model() {
        let c = client("http://localhost:9999");
        assert_eq!(
            c.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn blank_key_is_rejected() {
        let err = GeminiClient::new("http://x", "  ", "m", Duration::from_secs(1)).err();
        assert!(matches!(err, Some(AiError::MissingApiKey)));
    }

    #[test]
    fn from_config_without_key_is_none() {
        let config = ServiceConfig::default();
        assert!(GeminiClient::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn from_config_with_key_builds_client() {
        let config = ServiceConfig {
            gemini_api_key: Some("k".into()),
            gemini_model: "gemini-1.5-flash".into(),
            ..ServiceConfig::default()
        };
        let c = GeminiClient::from_config(&config).unwrap().unwrap();
        assert_eq!(c.model_name(), "gemini-1.5-flash");
    }

    #[test]
    fn unreachable_host_is_connection_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let c = client("http://127.0.0.1:9");
        let err = c.generate("hello").unwrap_err();
        assert!(
            matches!(err, AiError::Connection(_) | AiError::HttpClient(_) | AiError::Timeout(_)),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn request_body_shape() {
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: "p" }],
            }],
            safety_settings: vec![SafetySetting {
                category: "HARM_CATEGORY_HARASSMENT",
                threshold: "BLOCK_NONE",
            }],
            generation_config: GenerationConfig {
                temperature: 0.2,
                response_mime_type: "application/json",
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "p");
        assert_eq!(json["safetySettings"][0]["threshold"], "BLOCK_NONE");
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
    }

    #[test]
    fn response_text_joins_parts_of_first_candidate() {
        let parsed: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"{\"a\":"},{"text":"1}"}]}},
                              {"content":{"parts":[{"text":"ignored"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.first_text().as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn response_without_candidates_is_empty() {
        let parsed: GenerateResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert!(parsed.first_text().is_none());
    }

    #[test]
    fn mock_counts_calls_and_records_prompt() {
        let mock = MockLlmClient::new("reply");
        assert_eq!(mock.generate("first").unwrap(), "reply");
        assert_eq!(mock.generate("second").unwrap(), "reply");
        assert_eq!(mock.calls(), 2);
        assert_eq!(mock.last_prompt().as_deref(), Some("second"));
    }

    #[test]
    fn mock_failures() {
        let err = MockLlmClient::failing(403).generate("p").unwrap_err();
        assert!(matches!(err, AiError::Status { status: 403, .. }));
        let err = MockLlmClient::timing_out().generate("p").unwrap_err();
        assert!(matches!(err, AiError::Timeout(_)));
    }
}
