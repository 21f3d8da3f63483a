use serde::{Deserialize, Serialize};

use crate::error::{CouncilError, CouncilResult};

/// Public OpenRouter API base URL
pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1";

/// Configuration for the OpenRouter client.
///
/// Passed explicitly to [`crate::OpenRouterClient::new`] so tests can point
/// the client at a fake endpoint with a fake key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRouterConfig {
    /// OpenRouter API key, sent as a bearer token
    pub api_key: String,

    /// API base URL; `/chat/completions` is appended per request
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl OpenRouterConfig {
    /// Read config from `OPENROUTER_API_KEY` and (optionally) `OPENROUTER_API_URL`
    pub fn from_env() -> CouncilResult<Self> {
        let api_key = std::env::var("OPENROUTER_API_KEY")
            .map_err(|_| CouncilError::InvalidConfig("OPENROUTER_API_KEY not set".to_string()))?;
        let api_url =
            std::env::var("OPENROUTER_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Ok(Self { api_key, api_url })
    }
}
