//! ChatBrain implementation over an OpenAI-compatible chat-completions API.

use agent_core::{Message, Reasoner, ReasonerError, ToolDefinition};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::api_types::{ApiError, ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::config::ChatBrainConfig;

/// A reasoner that asks a hosted chat model for its next action.
///
/// ChatBrain is stateless: the orchestrator passes the full history on every
/// call and receives either a final answer or a batch of tool calls.
pub struct ChatBrain {
    client: Client,
    config: ChatBrainConfig,
}

impl ChatBrain {
    /// Create a new ChatBrain with the given configuration.
    pub fn new(config: ChatBrainConfig) -> Result<Self, ReasonerError> {
        if config.api_key.trim().is_empty() {
            return Err(ReasonerError::Configuration(
                "An API key is required for ChatBrain".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ReasonerError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        info!(
            "ChatBrain initialized with model: {}, endpoint: {}",
            config.model, config.api_url
        );

        Ok(Self { client, config })
    }

    /// Create a ChatBrain from environment variables.
    ///
    /// See [`ChatBrainConfig::from_env`] for required environment variables.
    pub fn from_env() -> Result<Self, ReasonerError> {
        let config = ChatBrainConfig::from_env()?;
        Self::new(config)
    }

    /// Get the configuration.
    pub fn config(&self) -> &ChatBrainConfig {
        &self.config
    }

    fn build_request(&self, history: &[Message], tools: &[ToolDefinition]) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: history.iter().map(ChatMessage::from).collect(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            tools: if tools.is_empty() {
                None
            } else {
                Some(tools.to_vec())
            },
        }
    }

    /// Make a chat completion request.
    async fn chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ReasonerError> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.api_url.trim_end_matches('/')
        );

        debug!(
            "Sending {} messages and {} tools to {}",
            request.messages.len(),
            request.tools.as_ref().map_or(0, Vec::len),
            url
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ReasonerError::Timeout
                } else {
                    ReasonerError::Network(format!("Failed to send request: {}", e))
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            // Try to parse as API error
            if let Ok(api_error) = serde_json::from_str::<ApiError>(&error_text) {
                return Err(ReasonerError::ProcessingFailed(format!(
                    "API error ({}): {}",
                    status.as_u16(),
                    api_error.error.message
                )));
            }

            return Err(ReasonerError::ProcessingFailed(format!(
                "API error ({}): {}",
                status.as_u16(),
                error_text
            )));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            ReasonerError::ProcessingFailed(format!("Failed to parse response: {}", e))
        })?;

        if let Some(ref usage) = completion.usage {
            debug!(
                "Token usage - prompt: {}, completion: {}, total: {}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        Ok(completion)
    }
}

#[async_trait]
impl Reasoner for ChatBrain {
    async fn next_action(
        &self,
        history: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<Message, ReasonerError> {
        let request = self.build_request(history, tools);
        let completion = self.chat_completion(request).await?;

        let Some(choice) = completion.choices.into_iter().next() else {
            warn!("Completion had no choices");
            return Err(ReasonerError::ProcessingFailed(
                "Completion returned no choices".to_string(),
            ));
        };

        debug!(
            "Completion finished with reason {:?}",
            choice.finish_reason.as_deref()
        );

        Ok(choice.message.into_message())
    }

    fn name(&self) -> &str {
        "ChatBrain"
    }
}
