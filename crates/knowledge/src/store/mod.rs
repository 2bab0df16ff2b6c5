//! Vector store abstraction.
//!
//! Stores are read-only from Companion's side: they answer nearest-neighbour
//! queries against an index some other system populated.

pub mod memory;
pub mod weaviate;

pub use memory::InMemoryStore;
pub use weaviate::WeaviateStore;

use crate::embeddings::EmbeddingProvider;
use crate::types::{SeedDocument, VectorMatch};
use companion_core::config::VectorStoreSettings;
use companion_core::{AppError, AppResult};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Trait for vector store backends.
#[async_trait::async_trait]
pub trait VectorStore: Send + Sync {
    /// Backend name for logs (e.g., "weaviate")
    fn store_name(&self) -> &str;

    /// Return up to `limit` records nearest to `vector`, closest first.
    ///
    /// An empty result is a normal answer. Transport and backend failures
    /// are `AppError::RetrievalUnavailable`.
    async fn nearest(&self, vector: &[f32], limit: usize) -> AppResult<Vec<VectorMatch>>;
}

/// Create a vector store from configuration.
///
/// The `memory` store embeds its seed documents with `embedder`, so it must
/// be the same provider the retriever uses for queries.
pub async fn create_store(
    settings: &VectorStoreSettings,
    workspace: &Path,
    api_key: Option<&str>,
    embedder: &dyn EmbeddingProvider,
) -> AppResult<Arc<dyn VectorStore>> {
    match settings.provider.to_lowercase().as_str() {
        "weaviate" => Ok(Arc::new(WeaviateStore::new(
            &settings.endpoint,
            &settings.class_name,
            api_key,
            Duration::from_secs(settings.timeout),
        )?)),

        "memory" => {
            let store = InMemoryStore::new();
            if let Some(ref file) = settings.documents_file {
                let path = if file.is_absolute() {
                    file.clone()
                } else {
                    workspace.join(file)
                };
                let documents = load_seed_documents(&path)?;
                store.insert_documents(embedder, &documents).await?;
                tracing::info!(
                    "Loaded {} documents into memory store from {:?}",
                    documents.len(),
                    path
                );
            }
            Ok(Arc::new(store))
        }

        _ => Err(AppError::Config(format!(
            "Unknown vector store: '{}'. Supported: weaviate, memory",
            settings.provider
        ))),
    }
}

/// Read a JSON array of `{text, url}` records.
pub fn load_seed_documents(path: &Path) -> AppResult<Vec<SeedDocument>> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::Config(format!("Failed to read documents file {:?}: {}", path, e))
    })?;

    serde_json::from_str(&contents).map_err(|e| {
        AppError::Config(format!("Failed to parse documents file {:?}: {}", path, e))
    })
}
