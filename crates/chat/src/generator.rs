//! Completion call for the substantive path.

use companion_core::{AppError, AppResult};
use companion_llm::{ChatMessage, LlmClient, LlmRequest};
use companion_prompt::PromptMessages;
use std::sync::Arc;
use tracing::{debug, info};

/// Sends composed prompts to the completion provider with a fixed model.
#[derive(Clone)]
pub struct Generator {
    client: Arc<dyn LlmClient>,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl Generator {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate raw reply text.
    ///
    /// A provider error (`AppError::Llm`) and an empty completion are
    /// `GenerationFailed`. Any other error is passed through unchanged.
    pub async fn generate(&self, messages: &PromptMessages) -> AppResult<String> {
        let mut request = LlmRequest::new(
            vec![
                ChatMessage::system(messages.system.clone()),
                ChatMessage::user(messages.user.clone()),
            ],
            &self.model,
        );
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        info!(
            provider = self.client.provider_name(),
            model = %self.model,
            "Requesting completion"
        );
        debug!("Prompt size: {} bytes", messages.user.len());

        let response = self
            .client
            .complete(&request)
            .await
            .map_err(|e| match e {
                AppError::Llm(message) => AppError::GenerationFailed(message),
                other => other,
            })?;

        if !response.has_content() {
            return Err(AppError::GenerationFailed(
                "provider returned no content".to_string(),
            ));
        }

        info!(
            tokens = response.usage.total_tokens,
            "Completion received"
        );

        Ok(response.content)
    }
}
