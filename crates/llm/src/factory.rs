//! LLM provider factory.
//!
//! Creates completion clients from application configuration, resolving
//! default endpoints and checking that keyed providers have a key.

use crate::client::LlmClient;
use crate::providers::{OllamaClient, OpenAiCompatClient};
use crate::types::ProviderType;
use companion_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("groq", "openai", "ollama")
/// * `endpoint` - Optional custom base URL
/// * `api_key` - API key (required by groq and openai)
/// * `timeout` - Per-request timeout
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown or a required key is
/// missing, and `AppError::Llm` if the HTTP client cannot be built.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout: Duration,
) -> AppResult<Arc<dyn LlmClient>> {
    let provider_type = ProviderType::parse(provider)
        .ok_or_else(|| AppError::Config(format!("Unknown provider: {}", provider)))?;

    let base_url = endpoint.unwrap_or_else(|| provider_type.default_endpoint());

    tracing::debug!(
        "Creating {} client at {}",
        provider_type.as_str(),
        base_url
    );

    if provider_type.requires_api_key() && api_key.is_none() {
        return Err(AppError::Config(format!(
            "{} provider requires API key",
            provider_type.as_str()
        )));
    }

    match provider_type {
        ProviderType::Ollama => Ok(Arc::new(OllamaClient::with_timeout(base_url, timeout)?)),
        ProviderType::Groq | ProviderType::OpenAI => Ok(Arc::new(OpenAiCompatClient::new(
            provider_type.as_str(),
            base_url,
            api_key.unwrap_or_default(),
            timeout,
        )?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn test_create_ollama_client() {
        let client = create_client("ollama", None, None, TIMEOUT).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_create_groq_client() {
        let client = create_client("groq", None, Some("key"), TIMEOUT).unwrap();
        assert_eq!(client.provider_name(), "groq");
    }

    #[test]
    fn test_groq_requires_api_key() {
        match create_client("groq", None, None, TIMEOUT) {
            Err(err) => assert!(err.to_string().contains("requires API key")),
            Ok(_) => panic!("Expected error for Groq without API key"),
        }
    }

    #[test]
    fn test_openai_requires_api_key() {
        let result = create_client("openai", None, None, TIMEOUT);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_ollama_ignores_missing_key() {
        assert!(create_client("ollama", Some("http://127.0.0.1:11434"), None, TIMEOUT).is_ok());
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("unknown", None, None, TIMEOUT) {
            Err(err) => assert!(err.to_string().contains("Unknown provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
