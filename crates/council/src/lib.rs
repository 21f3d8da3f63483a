//! OpenRouter client for the LLM Council backend.
//!
//! Builds chat-completion requests from typed parameters, posts them with
//! bearer authentication, and normalizes the reply. The same request can be
//! fanned out across several models concurrently; each model's failure is
//! isolated and reported as an absent entry in the batch result.

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::OpenRouterClient;
pub use config::OpenRouterConfig;
pub use error::{CouncilError, CouncilResult};
pub use types::{
    BatchReplies, ChatMessage, ModelReply, PluginDescriptor, QueryOptions, Role,
    SearchContextSize, WebEngine,
};
