use futures::future;
use reqwest::Client;
use tracing::{debug, error};

use crate::config::OpenRouterConfig;
use crate::error::{CouncilError, CouncilResult};
use crate::types::{
    BatchReplies, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ModelReply,
    OpenRouterErrorResponse, QueryOptions,
};

/// Client for the OpenRouter chat completions API
#[derive(Clone)]
pub struct OpenRouterClient {
    client: Client,
    config: OpenRouterConfig,
}

impl OpenRouterClient {
    pub fn new(config: OpenRouterConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Build a client from `OPENROUTER_API_KEY` / `OPENROUTER_API_URL`
    pub fn from_env() -> CouncilResult<Self> {
        Ok(Self::new(OpenRouterConfig::from_env()?))
    }

    pub fn config(&self) -> &OpenRouterConfig {
        &self.config
    }

    /// Query a single model.
    ///
    /// Never fails loudly: any transport, protocol, or format error is
    /// logged with the model identifier and reported as `None`.
    pub async fn query_model(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &QueryOptions,
    ) -> Option<ModelReply> {
        match self.query_model_inner(model, messages, options).await {
            Ok(reply) => Some(reply),
            Err(e) => {
                error!("Error querying model {}: {}", model, e);
                None
            }
        }
    }

    async fn query_model_inner(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &QueryOptions,
    ) -> CouncilResult<ModelReply> {
        let request = ChatCompletionRequest::new(model, messages, options);

        debug!(
            "Querying model {} with {} messages",
            model,
            messages.len()
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .timeout(options.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            // Surface the provider's error message when the body carries one
            if let Ok(error_resp) = serde_json::from_str::<OpenRouterErrorResponse>(&error_text) {
                return Err(CouncilError::OpenRouterApi {
                    message: error_resp.error.message,
                    status_code: Some(status.as_u16()),
                });
            }

            return Err(CouncilError::OpenRouterApi {
                message: error_text,
                status_code: Some(status.as_u16()),
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| ModelReply::from(choice.message))
            .ok_or_else(|| CouncilError::OpenRouterApi {
                message: "No completion returned".to_string(),
                status_code: None,
            })
    }

    /// Query multiple models concurrently with the same messages and options.
    ///
    /// All calls are scheduled at once and the batch returns when the slowest
    /// completes. A failed model yields `None` for its entry and never
    /// affects siblings. Entries keep input order; a duplicate identifier
    /// collapses to one entry at its first position, holding the last value
    /// written.
    pub async fn query_models(
        &self,
        models: &[String],
        messages: &[ChatMessage],
        options: &QueryOptions,
    ) -> BatchReplies {
        let calls = models.iter().map(|model| async move {
            (
                model.clone(),
                self.query_model(model, messages, options).await,
            )
        });

        future::join_all(calls).await.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = OpenRouterClient::new(OpenRouterConfig {
            api_key: "test-key".to_string(),
            api_url: "https://openrouter.ai/api/v1".to_string(),
        });
        assert_eq!(client.config().api_key, "test-key");
        assert_eq!(client.config().api_url, "https://openrouter.ai/api/v1");
    }
}
