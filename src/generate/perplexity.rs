use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{prompts, ContentGenerator, ContentKind, GenerationError};
use crate::config::ApiConfig;
use crate::Result;

/// Perplexity chat-completions client
pub struct PerplexityClient {
    http: reqwest::Client,
    api_url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

impl PerplexityClient {
    pub fn new(config: &ApiConfig, api_key: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            model: config.model.clone(),
            api_key,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

fn parse_content(body: &str) -> std::result::Result<String, GenerationError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::Unexpected(e.to_string()))?;

    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.trim().to_string())
        .ok_or_else(|| GenerationError::Unexpected("response contained no choices".to_string()))
}

#[async_trait]
impl ContentGenerator for PerplexityClient {
    async fn generate(&self, kind: ContentKind, transcript: &str) -> std::result::Result<String, GenerationError> {
        let api_key = self.api_key.as_deref().ok_or(GenerationError::MissingApiKey)?;
        tracing::debug!("Using Perplexity API key {}", crate::utils::mask_secret(api_key));

        let prompt = prompts::build(kind, transcript);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: prompt.system },
                ChatMessage { role: "user", content: &prompt.user },
            ],
        };

        tracing::info!("Generating {} ({} transcript characters)", kind, transcript.len());

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::Request(e.to_string()))?;

        tracing::debug!("Perplexity responded with {} for {}", status, kind);

        if !status.is_success() {
            return Err(GenerationError::Http { status: status.as_u16(), body });
        }

        parse_content(&body)
    }
}
