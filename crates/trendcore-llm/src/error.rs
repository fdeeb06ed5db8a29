use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("llm client is not configured: missing base url or api key")]
    NotConfigured,

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("llm api returned {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

pub type Result<T> = std::result::Result<T, LlmError>;

impl LlmError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LlmError::Timeout | LlmError::Network(_) | LlmError::HttpStatus { .. }
        )
    }
}
