//! LLM integration crate for Companion.
//!
//! This crate provides a provider-agnostic abstraction for chat-style
//! completion models behind a single trait.
//!
//! # Providers
//! - **Groq / OpenAI**: any OpenAI-compatible `/chat/completions` endpoint (default)
//! - **Ollama**: local runtime via `/api/chat`
//!
//! # Example
//! ```no_run
//! use companion_llm::{ChatMessage, LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new(vec![ChatMessage::user("Hello!")], "llama3.2");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{ChatMessage, ChatRole, LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{OllamaClient, OpenAiCompatClient};
pub use types::ProviderType;
