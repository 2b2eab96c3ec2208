use async_trait::async_trait;

#[async_trait]
pub trait SupportAssistant: Send + Sync {
    async fn reply(&self, message: &str) -> Result<String, SupportAssistantError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SupportAssistantError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("rate limited")]
    RateLimited,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
