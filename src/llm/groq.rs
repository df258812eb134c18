// Groq adapter implementation
// Groq exposes an OpenAI-shaped chat completions API.
// API Reference: https://console.groq.com/docs/api-reference

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::AdvisorConfig;
use crate::llm::provider::Advisor;
use crate::types::{AppError, AppResult};

const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

pub struct GroqAdvisor {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
    temperature: f32,
}

#[derive(Serialize)]
struct GroqChatRequest {
    model: String,
    messages: Vec<GroqMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct GroqMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct GroqChatResponse {
    choices: Vec<GroqChoice>,
}

#[derive(Deserialize)]
struct GroqChoice {
    message: GroqResponseMessage,
}

#[derive(Deserialize)]
struct GroqResponseMessage {
    content: String,
}

impl GroqAdvisor {
    pub fn new(config: &AdvisorConfig) -> Self {
        Self::with_api_base(config, GROQ_API_BASE)
    }

    pub fn with_api_base(config: &AdvisorConfig, api_base: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_base: api_base.to_string(),
            api_key: config.groq_api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
        }
    }
}

#[async_trait]
impl Advisor for GroqAdvisor {
    async fn complete(&self, prompt: &str) -> AppResult<String> {
        let request = GroqChatRequest {
            model: self.model.clone(),
            messages: vec![GroqMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Advisor(format!("Groq request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Advisor(format!(
                "Groq API returned {status}: {body}"
            )));
        }

        let parsed: GroqChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Advisor(format!("Groq response decode failed: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AppError::Advisor("Groq response contained no choices".to_string()))
    }
}
