/// LLM Client: the Text-Generation Gateway used by the analysis pipeline and the agent.
///
/// ARCHITECTURAL RULE: No other module may call the remote model directly.
/// All generation goes through the `TextGenerator` trait; `LlmClient` is the
/// production implementation, constructed once in `main` and injected.
///
/// One request, one response. No retries here: a failed call is reported to the
/// caller, which records it (analysis runs end `failed`).
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::LlmSettings;

pub mod prompts;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Free-form text generation. No structure is guaranteed on the returned text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// Generation with a separate system instruction. Backends without a system
    /// role fold it into the prompt.
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        self.generate(&format!("{system}\n\n{prompt}")).await
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Extracts the text of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Client for an OpenAI-compatible chat-completions endpoint (Groq by default).
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    max_tokens: u32,
}

impl LlmClient {
    pub fn new(settings: &LlmSettings) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            client,
            api_key: settings.api_key.clone(),
            endpoint: format!("{}/chat/completions", settings.base_url.trim_end_matches('/')),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Makes a single chat-completions call and returns the full response object.
    pub async fn call(&self, system: Option<&str>, prompt: &str) -> Result<ChatResponse, LlmError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });

        let request_body = ChatRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: 1.0,
            messages,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat_response: ChatResponse = response.json().await?;

        if let Some(usage) = &chat_response.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(chat_response)
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let response = self.call(None, prompt).await?;
        non_empty_text(&response)
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let response = self.call(Some(system), prompt).await?;
        non_empty_text(&response)
    }
}

fn non_empty_text(response: &ChatResponse) -> Result<String, LlmError> {
    response
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .ok_or(LlmError::EmptyContent)
}
