use thiserror::Error;

/// Errors from the chat completion layer.
///
/// Chat failures are isolated from the retrieval pipeline: callers that hit
/// one still have the assembled prompt and citations in hand.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("missing API key: set the {var} environment variable")]
    MissingApiKey { var: &'static str },

    #[error("chat completion request failed: {0}")]
    Api(#[from] async_openai::error::OpenAIError),

    #[error("chat completion returned no choices")]
    EmptyResponse,
}
