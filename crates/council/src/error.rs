use thiserror::Error;

/// Errors surfaced by the OpenRouter client
#[derive(Debug, Error)]
pub enum CouncilError {
    #[error("OpenRouter API error: {message}")]
    OpenRouterApi {
        message: String,
        status_code: Option<u16>,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for council operations
pub type CouncilResult<T> = Result<T, CouncilError>;
