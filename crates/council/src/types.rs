use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Default web plugin result count, matching the OpenRouter default
pub const DEFAULT_WEB_MAX_RESULTS: u32 = 5;

/// Role in a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Web search engine override for the web plugin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebEngine {
    Native,
    Exa,
}

/// Native search context sizing hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchContextSize {
    Low,
    Medium,
    High,
}

/// Per-request options shared by single and batch queries
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Request timeout
    pub timeout: Duration,
    /// Enable the OpenRouter web search plugin for this request
    pub online: bool,
    /// Web engine override
    pub web_engine: Option<WebEngine>,
    /// Max number of web results; `None` omits the field from the plugin
    pub web_max_results: Option<u32>,
    /// Prompt prefix for attaching web results
    pub web_search_prompt: Option<String>,
    /// Native search context size hint
    pub web_search_context_size: Option<SearchContextSize>,
    /// Additional plugins to enable, forwarded verbatim after the web plugin
    pub extra_plugins: Vec<Map<String, Value>>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            online: false,
            web_engine: None,
            web_max_results: Some(DEFAULT_WEB_MAX_RESULTS),
            web_search_prompt: None,
            web_search_context_size: None,
            extra_plugins: Vec::new(),
        }
    }
}

/// The OpenRouter web search plugin descriptor
#[derive(Debug, Clone, Serialize)]
pub struct WebPlugin {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<WebEngine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_prompt: Option<String>,
}

/// A plugin entry in the request: either the typed web plugin or an opaque
/// caller-supplied descriptor
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PluginDescriptor {
    Web(WebPlugin),
    Opaque(Map<String, Value>),
}

/// Native web search options
#[derive(Debug, Clone, Serialize)]
pub struct WebSearchOptions {
    pub search_context_size: SearchContextSize,
}

/// Request for chat completions
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugins: Option<Vec<PluginDescriptor>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_search_options: Option<WebSearchOptions>,
}

impl ChatCompletionRequest {
    /// Assemble the request payload.
    ///
    /// The web plugin (when `online`) always precedes caller-supplied extras.
    /// `plugins` and `web_search_options` are omitted entirely when nothing
    /// was configured for them; absent options never serialize as nulls.
    pub fn new(model: &str, messages: &[ChatMessage], options: &QueryOptions) -> Self {
        let mut plugins: Vec<PluginDescriptor> = Vec::new();

        if options.online {
            plugins.push(PluginDescriptor::Web(WebPlugin {
                id: "web".to_string(),
                engine: options.web_engine,
                max_results: options.web_max_results,
                search_prompt: options.web_search_prompt.clone(),
            }));
        }

        plugins.extend(
            options
                .extra_plugins
                .iter()
                .cloned()
                .map(PluginDescriptor::Opaque),
        );

        Self {
            model: model.to_string(),
            messages: messages.to_vec(),
            plugins: if plugins.is_empty() {
                None
            } else {
                Some(plugins)
            },
            web_search_options: options
                .web_search_context_size
                .map(|size| WebSearchOptions {
                    search_context_size: size,
                }),
        }
    }
}

/// Response from the chat completions endpoint
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

/// A choice in the chat completion response
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ResponseMessage,
}

/// Assistant message as returned by the provider
#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub reasoning_details: Option<Value>,
    #[serde(default)]
    pub annotations: Option<Value>,
}

/// Normalized reply from one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelReply {
    pub content: Option<String>,
    pub reasoning_details: Option<Value>,
    pub annotations: Option<Value>,
}

impl From<ResponseMessage> for ModelReply {
    fn from(message: ResponseMessage) -> Self {
        Self {
            content: message.content,
            reasoning_details: message.reasoning_details,
            annotations: message.annotations,
        }
    }
}

/// Batch result: model identifier to reply, in input order. `None` marks a
/// call that did not complete successfully.
pub type BatchReplies = IndexMap<String, Option<ModelReply>>;

/// Error response from OpenRouter
#[derive(Debug, Deserialize)]
pub struct OpenRouterErrorResponse {
    pub error: OpenRouterErrorDetail,
}

/// Error detail
#[derive(Debug, Deserialize)]
pub struct OpenRouterErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    pub code: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn messages() -> Vec<ChatMessage> {
        vec![ChatMessage::user("What is the capital of France?")]
    }

    #[test]
    fn test_chat_message_constructors() {
        let sys = ChatMessage::system("You are helpful");
        assert_eq!(sys.role, Role::System);

        let user = ChatMessage::user("Hello");
        assert_eq!(user.role, Role::User);

        let asst = ChatMessage::assistant("Hi there");
        assert_eq!(asst.role, Role::Assistant);
    }

    #[test]
    fn test_default_options() {
        let options = QueryOptions::default();
        assert_eq!(options.timeout, Duration::from_secs(120));
        assert!(!options.online);
        assert_eq!(options.web_max_results, Some(5));
        assert!(options.web_engine.is_none());
        assert!(options.extra_plugins.is_empty());
    }

    #[test]
    fn test_offline_request_omits_plugins_and_search_options() {
        let options = QueryOptions {
            extra_plugins: Vec::new(),
            web_search_context_size: None,
            ..Default::default()
        };
        let request = ChatCompletionRequest::new("openai/gpt-4o", &messages(), &options);

        let payload = serde_json::to_value(&request).unwrap();
        assert_eq!(payload["model"], "openai/gpt-4o");
        assert_eq!(payload["messages"][0]["role"], "user");
        assert!(payload.get("plugins").is_none());
        assert!(payload.get("web_search_options").is_none());
    }

    #[test]
    fn test_online_request_builds_web_plugin() {
        let options = QueryOptions {
            online: true,
            web_max_results: Some(7),
            ..Default::default()
        };
        let request = ChatCompletionRequest::new("openai/gpt-4o", &messages(), &options);

        let payload = serde_json::to_value(&request).unwrap();
        assert_eq!(
            payload["plugins"],
            json!([{"id": "web", "max_results": 7}])
        );
    }

    #[test]
    fn test_online_request_includes_engine_and_prompt_when_set() {
        let options = QueryOptions {
            online: true,
            web_engine: Some(WebEngine::Exa),
            web_max_results: None,
            web_search_prompt: Some("Sources:".to_string()),
            ..Default::default()
        };
        let request = ChatCompletionRequest::new("openai/gpt-4o", &messages(), &options);

        let payload = serde_json::to_value(&request).unwrap();
        assert_eq!(
            payload["plugins"],
            json!([{"id": "web", "engine": "exa", "search_prompt": "Sources:"}])
        );
    }

    #[test]
    fn test_web_plugin_precedes_extra_plugins() {
        let extra = json!({"id": "X"});
        let Value::Object(extra) = extra else {
            unreachable!()
        };
        let options = QueryOptions {
            online: true,
            extra_plugins: vec![extra],
            ..Default::default()
        };
        let request = ChatCompletionRequest::new("openai/gpt-4o", &messages(), &options);

        let payload = serde_json::to_value(&request).unwrap();
        let plugins = payload["plugins"].as_array().unwrap();
        assert_eq!(plugins.len(), 2);
        assert_eq!(plugins[0]["id"], "web");
        assert_eq!(plugins[1], json!({"id": "X"}));
    }

    #[test]
    fn test_extra_plugins_without_online_still_attach() {
        let Value::Object(extra) = json!({"id": "X", "nested": {"k": 1}}) else {
            unreachable!()
        };
        let options = QueryOptions {
            online: false,
            extra_plugins: vec![extra],
            ..Default::default()
        };
        let request = ChatCompletionRequest::new("openai/gpt-4o", &messages(), &options);

        let payload = serde_json::to_value(&request).unwrap();
        assert_eq!(
            payload["plugins"],
            json!([{"id": "X", "nested": {"k": 1}}])
        );
    }

    #[test]
    fn test_search_context_size_attaches_web_search_options() {
        let options = QueryOptions {
            web_search_context_size: Some(SearchContextSize::High),
            ..Default::default()
        };
        let request = ChatCompletionRequest::new("openai/gpt-4o", &messages(), &options);

        let payload = serde_json::to_value(&request).unwrap();
        assert_eq!(
            payload["web_search_options"],
            json!({"search_context_size": "high"})
        );
        // Context sizing alone does not imply the web plugin
        assert!(payload.get("plugins").is_none());
    }

    #[test]
    fn test_response_message_fields_default_to_absent() {
        let message: ResponseMessage = serde_json::from_value(json!({})).unwrap();
        let reply = ModelReply::from(message);
        assert_eq!(
            reply,
            ModelReply {
                content: None,
                reasoning_details: None,
                annotations: None,
            }
        );
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "choices": [{"message": {
                "content": "hi",
                "reasoning_details": [{"type": "reasoning.text"}],
                "annotations": [{"type": "url_citation"}]
            }}]
        }"#;

        let response: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        let reply = ModelReply::from(
            response
                .choices
                .into_iter()
                .next()
                .unwrap()
                .message,
        );
        assert_eq!(reply.content.as_deref(), Some("hi"));
        assert!(reply.reasoning_details.is_some());
        assert!(reply.annotations.is_some());
    }
}
