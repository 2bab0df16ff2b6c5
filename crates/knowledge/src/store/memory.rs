//! In-memory [`VectorStore`] for development and tests.
//!
//! Brute-force cosine similarity over every stored vector.

use super::VectorStore;
use crate::embeddings::EmbeddingProvider;
use crate::types::{SeedDocument, VectorMatch};
use companion_core::{AppError, AppResult};
use std::sync::RwLock;

struct StoredVector {
    text: String,
    url: Option<String>,
    vector: Vec<f32>,
}

/// In-memory store.
pub struct InMemoryStore {
    vectors: RwLock<Vec<StoredVector>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            vectors: RwLock::new(Vec::new()),
        }
    }

    /// Add one record with a precomputed vector.
    pub fn insert(&self, text: impl Into<String>, url: Option<String>, vector: Vec<f32>) -> AppResult<()> {
        let mut vectors = self
            .vectors
            .write()
            .map_err(|_| AppError::RetrievalUnavailable("memory store lock poisoned".to_string()))?;
        vectors.push(StoredVector {
            text: text.into(),
            url,
            vector,
        });
        Ok(())
    }

    /// Embed and add documents.
    pub async fn insert_documents(
        &self,
        embedder: &dyn EmbeddingProvider,
        documents: &[SeedDocument],
    ) -> AppResult<()> {
        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
        let vectors = embedder.embed_batch(&texts).await?;

        for (doc, vector) in documents.iter().zip(vectors) {
            self.insert(doc.text.clone(), doc.url.clone(), vector)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.vectors.read().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a < f32::EPSILON || mag_b < f32::EPSILON {
        0.0
    } else {
        dot / (mag_a * mag_b)
    }
}

#[async_trait::async_trait]
impl VectorStore for InMemoryStore {
    fn store_name(&self) -> &str {
        "memory"
    }

    async fn nearest(&self, vector: &[f32], limit: usize) -> AppResult<Vec<VectorMatch>> {
        let vectors = self
            .vectors
            .read()
            .map_err(|_| AppError::RetrievalUnavailable("memory store lock poisoned".to_string()))?;

        let mut scored: Vec<(f32, &StoredVector)> = vectors
            .iter()
            .map(|sv| (cosine_similarity(vector, &sv.vector), sv))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(score, sv)| VectorMatch {
                text: sv.text.clone(),
                url: sv.url.clone(),
                score: Some(score),
            })
            .collect())
    }
}
