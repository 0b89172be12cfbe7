//! Chat-completions client for OpenAI-compatible servers (OpenAI, Ollama,
//! vLLM). Structured turns ask the server for a JSON object. No timeout or
//! retry is applied; a failed call fails the turn.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use skydesk_core::config::LlmConfig;
use thiserror::Error;
use tracing::debug;

use crate::conversation::ConversationTurn;
use crate::llm::{CompletionMode, LlmClient};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("completion request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("completion endpoint returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("failed to decode completion response: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("completion response contained no message content")]
    EmptyCompletion,
}

pub struct OpenAiCompatibleClient {
    client: Client,
    endpoint: String,
    api_key: Option<SecretString>,
    model: String,
    temperature: f32,
}

impl OpenAiCompatibleClient {
    pub fn new(
        base_url: &str,
        model: impl Into<String>,
        temperature: f32,
        api_key: Option<SecretString>,
    ) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key,
            model: model.into(),
            temperature,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Self {
        Self::new(
            config.endpoint_base(),
            config.model.clone(),
            config.temperature,
            config.api_key.clone(),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(
        &self,
        history: &[ConversationTurn],
        mode: CompletionMode,
    ) -> Result<String, LlmError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: history.iter().map(ChatMessage::from).collect(),
            response_format: match mode {
                CompletionMode::Structured => Some(ResponseFormat { kind: "json_object" }),
                CompletionMode::Natural => None,
            },
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        let response = request.send().await.map_err(LlmError::Transport)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status { status, body });
        }

        let payload: ChatCompletionResponse = response.json().await.map_err(LlmError::Decode)?;
        payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(LlmError::EmptyCompletion)
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatibleClient {
    async fn complete(
        &self,
        history: &[ConversationTurn],
        mode: CompletionMode,
    ) -> Result<String> {
        debug!(
            event_name = "llm.completion.request",
            endpoint = %self.endpoint,
            model = %self.model,
            mode = ?mode,
            history_len = history.len(),
            "sending completion request"
        );
        Ok(self.send(history, mode).await?)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a ConversationTurn> for ChatMessage<'a> {
    fn from(turn: &'a ConversationTurn) -> Self {
        Self { role: turn.role.as_str(), content: &turn.content }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}
