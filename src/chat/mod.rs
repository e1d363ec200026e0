//! Chat completion client for the OpenAI-compatible answer endpoint.
//!
//! Thin wrapper over `async-openai` pointed at a configurable base URL (Poe
//! by default). Construction fails fast on a missing API key so callers can
//! degrade to prompt-only output instead of discovering the problem at
//! query time.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ChatError;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
    CreateChatCompletionRequestArgs,
};
use futures_util::StreamExt;
use tokio_stream::Stream;
use tracing::{debug, info};

use crate::config::RagConfig;

/// Environment variable holding the API key for the chat endpoint.
pub const ENV_API_KEY: &str = "POE_API_KEY";

const SYSTEM_MESSAGE: &str = "You are a helpful AI assistant that answers questions \
                              about PDF documents with accurate citations.";

/// Client for the final answer generation step.
pub struct ChatClient {
    client: Client<OpenAIConfig>,
    model: String,
    max_tokens: u32,
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}

impl ChatClient {
    /// Creates a client against `config`'s endpoint with an explicit key.
    pub fn new(config: &RagConfig, api_key: impl Into<String>) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_base(&config.chat_base_url)
            .with_api_key(api_key);

        info!(
            base_url = %config.chat_base_url,
            model = %config.chat_model,
            "Chat client initialized"
        );

        Self {
            client: Client::with_config(openai_config),
            model: config.chat_model.clone(),
            max_tokens: config.max_tokens,
        }
    }

    /// Creates a client reading the API key from [`ENV_API_KEY`].
    pub fn from_env(config: &RagConfig) -> Result<Self, ChatError> {
        let api_key = std::env::var(ENV_API_KEY)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ChatError::MissingApiKey { var: ENV_API_KEY })?;

        Ok(Self::new(config, api_key))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, prompt: &str, stream: bool) -> Result<CreateChatCompletionRequest, ChatError> {
        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(SYSTEM_MESSAGE)
                    .build()?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(prompt)
                    .build()?,
            ),
        ];

        Ok(CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_completion_tokens(self.max_tokens)
            .stream(stream)
            .build()?)
    }

    /// Sends the prompt and returns the full assistant reply.
    pub async fn complete(&self, prompt: &str) -> Result<String, ChatError> {
        let request = self.build_request(prompt, false)?;

        debug!(model = %self.model, prompt_len = prompt.len(), "Sending chat completion");

        let response = self.client.chat().create(request).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(ChatError::EmptyResponse)
    }

    /// Sends the prompt and returns a stream of reply fragments in arrival
    /// order. Empty deltas (role-only frames, keep-alives) are filtered out.
    pub async fn complete_streaming(
        &self,
        prompt: &str,
    ) -> Result<impl Stream<Item = Result<String, ChatError>> + Send + Unpin + use<>, ChatError>
    {
        let request = self.build_request(prompt, true)?;

        debug!(model = %self.model, prompt_len = prompt.len(), "Opening chat completion stream");

        let stream = self.client.chat().create_stream(request).await?;

        Ok(Box::pin(stream.filter_map(|result| async move {
            match result {
                Ok(response) => response
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.delta.content)
                    .filter(|content| !content.is_empty())
                    .map(Ok),
                Err(e) => Some(Err(ChatError::Api(e))),
            }
        })))
    }
}
