//! Request orchestration.
//!
//! A query moves through the stages below in order. Greetings short-circuit
//! from `Classified` to `Completed`. Recoverable failures (embedding,
//! retrieval, generation) still end in `Completed` with fallback text. Only an
//! unmodelled error or a panic reaches `Failed`, and the caller then receives
//! a single fixed apology.
//!
//! ```text
//! Received -> Classified -> Retrieved -> Generated -> Enhanced -> Completed
//!                  \                         \
//!                   greeting -> Completed     generation failed -> Completed
//! ```

use crate::enhancer::ResponseEnhancer;
use crate::generator::Generator;
use crate::intent::classify;
use crate::library::{RandomSource, ResponseLibrary, ThreadRandom};
use crate::types::{Intent, Query, Reply};
use companion_core::{AppConfig, AppError, AppResult};
use companion_knowledge::{create_provider, create_store, Retriever};
use companion_llm::create_client;
use companion_prompt::{load_prompt, PromptComposer};
use futures::FutureExt;
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, info_span, warn, Instrument};

/// Reply when the completion provider fails or returns nothing.
pub const GENERATION_FALLBACK: &str =
    "I want to help but I'm having trouble formulating a response. Could we try that again?";

/// Reply when the query could not be embedded.
pub const EMBEDDING_FALLBACK: &str =
    "I'm having trouble understanding that right now. Could you rephrase your question?";

/// Reply for anything unexpected.
pub const CATCH_ALL_FALLBACK: &str =
    "I'm having a moment. Can we try that again? I really want to help you.";

/// Pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Received,
    Classified,
    Retrieved,
    Generated,
    Enhanced,
    Completed,
    Failed,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Received => "received",
            Stage::Classified => "classified",
            Stage::Retrieved => "retrieved",
            Stage::Generated => "generated",
            Stage::Enhanced => "enhanced",
            Stage::Completed => "completed",
            Stage::Failed => "failed",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn enter(stage: Stage) {
    debug!(stage = stage.as_str(), "Stage transition");
}

/// The companion's request pipeline.
#[derive(Clone)]
pub struct Pipeline {
    library: Arc<ResponseLibrary>,
    retriever: Retriever,
    composer: PromptComposer,
    generator: Generator,
    enhancer: ResponseEnhancer,
}

impl Pipeline {
    pub fn new(
        library: Arc<ResponseLibrary>,
        retriever: Retriever,
        composer: PromptComposer,
        generator: Generator,
    ) -> Self {
        let enhancer = ResponseEnhancer::new(library.clone());
        Self {
            library,
            retriever,
            composer,
            generator,
            enhancer,
        }
    }

    /// Build every component from configuration.
    pub async fn from_config(config: &AppConfig) -> AppResult<Self> {
        let embedder = create_provider(&config.embedding, config.embedding_api_key().as_deref())?;
        info!(
            provider = embedder.provider_name(),
            model = embedder.model_name(),
            "Embedding provider ready"
        );

        let store = create_store(
            &config.vector_store,
            &config.workspace,
            config.vector_store_api_key().as_deref(),
            embedder.as_ref(),
        )
        .await?;
        info!(store = store.store_name(), "Vector store ready");

        let retriever = Retriever::new(embedder, store).with_top_k(config.vector_store.top_k);

        let client = create_client(
            &config.llm.provider,
            config.llm.endpoint.as_deref(),
            config.llm_api_key().as_deref(),
            Duration::from_secs(config.llm.timeout),
        )?;
        let generator = Generator::new(client, &config.llm.model)
            .with_temperature(config.llm.temperature)
            .with_max_tokens(config.llm.max_tokens);

        let composer = match config.persona.prompt_file {
            Some(ref id) => PromptComposer::new(load_prompt(&config.workspace, id)?)?,
            None => PromptComposer::companion_default()?,
        };
        debug!("Persona prompt: {}", composer.definition().id);

        let random: Arc<dyn RandomSource> = Arc::new(ThreadRandom);
        let library = Arc::new(ResponseLibrary::from_settings(&config.persona, random)?);

        Ok(Self::new(library, retriever, composer, generator))
    }

    /// Validate raw input and respond.
    ///
    /// Fails only with `AppError::EmptyQuery`; nothing downstream runs then.
    pub async fn handle(&self, text: &str, user_id: Option<String>) -> AppResult<Reply> {
        let query = Query::new(text, user_id)?;
        Ok(self.respond(&query).await)
    }

    /// Answer a validated query. Never fails and never panics outward.
    pub async fn respond(&self, query: &Query) -> Reply {
        let span = info_span!(
            "chat",
            request_id = %uuid::Uuid::new_v4(),
            user_id = query.user_id().unwrap_or("anonymous"),
        );

        async {
            enter(Stage::Received);
            let intent = classify(query.text());
            enter(Stage::Classified);
            debug!(?intent, "Classified query");

            let outcome = AssertUnwindSafe(self.run(intent, query))
                .catch_unwind()
                .await;

            let reply = match outcome {
                Ok(Ok(text)) => Reply {
                    text,
                    intent,
                    stage: Stage::Completed,
                },
                Ok(Err(e)) => {
                    warn!("Request failed: {}", e);
                    self.failed(intent)
                }
                Err(_) => {
                    warn!("Request panicked");
                    self.failed(intent)
                }
            };

            enter(reply.stage);
            reply
        }
        .instrument(span)
        .await
    }

    fn failed(&self, intent: Intent) -> Reply {
        Reply {
            text: CATCH_ALL_FALLBACK.to_string(),
            intent,
            stage: Stage::Failed,
        }
    }

    async fn run(&self, intent: Intent, query: &Query) -> AppResult<String> {
        if intent == Intent::Greeting {
            return Ok(self.library.pick_greeting().to_string());
        }

        let chunk = match self.retriever.retrieve(query.text()).await {
            Ok(chunk) => chunk,
            Err(AppError::Embedding(e)) => {
                warn!("Query embedding failed: {}", e);
                return Ok(EMBEDDING_FALLBACK.to_string());
            }
            Err(AppError::RetrievalUnavailable(e)) => {
                warn!("Retrieval unavailable, continuing without context: {}", e);
                None
            }
            Err(e) => return Err(e),
        };
        enter(Stage::Retrieved);
        debug!(found = chunk.is_some(), "Retrieval finished");

        let messages = self
            .composer
            .compose(chunk.as_ref().map(|c| c.text.as_str()), query.text())?;

        let raw = match self.generator.generate(&messages).await {
            Ok(raw) => raw,
            Err(AppError::GenerationFailed(e)) => {
                warn!("Generation failed: {}", e);
                return Ok(GENERATION_FALLBACK.to_string());
            }
            Err(e) => return Err(e),
        };
        enter(Stage::Generated);

        let response = self
            .enhancer
            .enhance(&raw, chunk.as_ref().and_then(|c| c.source_url.as_deref()));
        enter(Stage::Enhanced);

        Ok(response)
    }
}
