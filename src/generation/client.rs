// src/generation/client.rs
use crate::generation::models::{ApiErrorBody, ChatMessage, ChatRequest, ChatResponse, GenerationConfig};
use crate::generation::prompts::PromptSet;
use crate::utils::error::GenerationError;
use async_trait::async_trait;
use reqwest::header;

/// Anything that turns an item name into generated review text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, item: &str) -> Result<String, GenerationError>;
}

/// Chat-completion client for an OpenAI-compatible endpoint.
pub struct ChatClient {
    http: reqwest::Client,
    config: GenerationConfig,
    prompts: PromptSet,
    api_key: String,
}

impl ChatClient {
    pub fn new(config: GenerationConfig, prompts: PromptSet) -> Result<Self, GenerationError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(GenerationError::MissingApiKey)?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            config,
            prompts,
            api_key,
        })
    }

    /// Sends the role prompt and the unrendered primer once so the operator
    /// sees credential or endpoint problems before the batch starts.
    pub async fn send_primer(&self) -> Result<(), GenerationError> {
        self.complete(self.prompts.primer_template(), self.config.primer_max_tokens)
            .await?;
        tracing::info!("Primer set successfully.");
        Ok(())
    }

    async fn complete(&self, user_prompt: &str, max_tokens: u32) -> Result<String, GenerationError> {
        let endpoint = self.config.completions_endpoint();
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage { role: "system", content: self.prompts.role_prompt() },
                ChatMessage { role: "user", content: user_prompt },
            ],
            max_tokens,
            temperature: self.config.temperature,
        };

        tracing::debug!("POST {} (model {}, max_tokens {})", endpoint, self.config.model, max_tokens);
        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .header(header::ACCEPT, "application/json")
            .json(&request)
            .send()
            .await?; // Propagates reqwest::Error as GenerationError::Network

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(status_error(status, &body));
        }
        parse_completion(&body)
    }
}

#[async_trait]
impl TextGenerator for ChatClient {
    async fn generate(&self, item: &str) -> Result<String, GenerationError> {
        let prompt = self.prompts.render_primer(item);
        self.complete(&prompt, self.config.max_tokens).await
    }
}

/// Maps a non-2xx response to an error, keeping the service's message.
fn status_error(status: reqwest::StatusCode, body: &str) -> GenerationError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.trim().to_string());
    tracing::error!("HTTP error status: {} ({})", status, message);

    match status {
        reqwest::StatusCode::TOO_MANY_REQUESTS => GenerationError::RateLimited,
        reqwest::StatusCode::UNAUTHORIZED => GenerationError::Unauthorized,
        _ => GenerationError::Http { status, message },
    }
}

/// Text of the first choice, trimmed.
fn parse_completion(body: &str) -> Result<String, GenerationError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| GenerationError::Parse(e.to_string()))?;
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .unwrap_or_default();
    if content.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    Ok(content)
}
