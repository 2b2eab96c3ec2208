use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::application::ports::{SupportAssistant, SupportAssistantError};

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

const SYSTEM_INSTRUCTION: &str = "You are a helpful customer support agent for 'Snow & Mow', an on-demand landscaping app. Keep answers short, friendly, and professional.";
const EMPTY_REPLY: &str = "I'm having trouble thinking right now.";

pub struct GeminiAssistant {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    fn text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

impl GeminiAssistant {
    pub fn new(api_key: String, model: String, api_base: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key,
            model,
        }
    }
}

#[async_trait]
impl SupportAssistant for GeminiAssistant {
    async fn reply(&self, message: &str) -> Result<String, SupportAssistantError> {
        let request_body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: SYSTEM_INSTRUCTION,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: message }],
            }],
        };

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.api_base, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| SupportAssistantError::ApiRequestFailed(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SupportAssistantError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SupportAssistantError::ApiRequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let text = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| SupportAssistantError::InvalidResponse(e.to_string()))?
            .text();

        if text.trim().is_empty() {
            return Ok(EMPTY_REPLY.to_string());
        }
        Ok(text)
    }
}
