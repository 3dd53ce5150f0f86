use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("completion backend returned {status}: {body}")]
    Backend { status: u16, body: String },
    #[error("completion response carried no content")]
    EmptyResponse,
}

/// Text-completion collaborator. Implementations are stateless from the
/// caller's perspective and safe for concurrent reuse.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError>;
}
