use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("no content found in document")]
    NoContentFound,

    #[error("invalid CSS selector: {0}")]
    InvalidSelector(String),

    #[error("invalid base url: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, ExtractionError>;
