//! Gemini `generateContent` client.

use crate::briefing::system_instruction;
use crate::chat::{Assistant, ChatRole, ChatTurn, EMPTY_ANSWER};
use crate::error::{AssistantError, AssistantResult};
use async_trait::async_trait;
use farmdesk_types::FarmSnapshot;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Gemini API configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API key sent in the `x-goog-api-key` header.
    #[serde(skip_serializing)]
    pub api_key: String,
    pub model: String,
    /// Base URL for the Generative Language API
    /// (e.g. `https://generativelanguage.googleapis.com`).
    pub api_base_url: String,
    pub temperature: f64,
    pub timeout_secs: Option<u64>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-3-flash-preview".to_string(),
            api_base_url: "https://generativelanguage.googleapis.com".to_string(),
            temperature: 0.7,
            timeout_secs: Some(60),
        }
    }
}

// Wire types for generateContent.

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<ChatRole>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Assistant backed by the Gemini REST API.
pub struct GeminiAssistant {
    config: GeminiConfig,
    client: Client,
}

impl GeminiAssistant {
    pub fn new(config: GeminiConfig) -> AssistantResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(AssistantError::MissingApiKey);
        }
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl Assistant for GeminiAssistant {
    async fn ask(
        &self,
        snapshot: &FarmSnapshot,
        history: &[ChatTurn],
        question: &str,
    ) -> AssistantResult<String> {
        let instruction = system_instruction(snapshot);
        let mut contents: Vec<Content<'_>> = history
            .iter()
            .map(|turn| Content {
                role: Some(turn.role),
                parts: vec![Part { text: &turn.text }],
            })
            .collect();
        contents.push(Content {
            role: Some(ChatRole::User),
            parts: vec![Part { text: question }],
        });

        let request = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: &instruction }],
            },
            contents,
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
            },
        };

        debug!(model = %self.config.model, turns = history.len(), "asking assistant");
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AssistantError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateResponse = serde_json::from_slice(&response.bytes().await?)?;
        let text = body.text();
        if text.trim().is_empty() {
            return Ok(EMPTY_ANSWER.to_string());
        }
        Ok(text)
    }
}
