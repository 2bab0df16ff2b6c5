//! Embedding provider trait and factory.

use super::providers::{MockProvider, OllamaProvider, OpenAiProvider};
use companion_core::config::EmbeddingSettings;
use companion_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "mock", "openai", "ollama")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate the embedding for a single text.
    ///
    /// Returns an empty vector when the provider answered without one.
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        Ok(results.pop().unwrap_or_default())
    }
}

/// Create an embedding provider based on configuration.
pub fn create_provider(
    settings: &EmbeddingSettings,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    let timeout = Duration::from_secs(settings.timeout);

    match settings.provider.to_lowercase().as_str() {
        "mock" => Ok(Arc::new(MockProvider::new(settings.dimensions))),

        "ollama" => {
            let endpoint = settings
                .endpoint
                .as_deref()
                .unwrap_or(OllamaProvider::DEFAULT_URL);
            Ok(Arc::new(OllamaProvider::new(
                endpoint,
                &settings.model,
                settings.dimensions,
                timeout,
            )?))
        }

        "openai" => {
            let key = api_key.ok_or_else(|| {
                AppError::Config("openai embedding provider requires API key".to_string())
            })?;
            let endpoint = settings
                .endpoint
                .as_deref()
                .unwrap_or(OpenAiProvider::DEFAULT_URL);
            Ok(Arc::new(OpenAiProvider::new(
                endpoint,
                key,
                &settings.model,
                settings.dimensions,
                timeout,
            )?))
        }

        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: mock, ollama, openai",
            settings.provider
        ))),
    }
}
