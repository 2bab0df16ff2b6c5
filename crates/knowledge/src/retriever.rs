//! Single-best-chunk retrieval.

use crate::embeddings::EmbeddingProvider;
use crate::store::VectorStore;
use crate::types::RetrievedChunk;
use companion_core::{AppError, AppResult};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Embeds a query and returns the nearest indexed chunk.
///
/// Errors keep their origin: `Embedding` when the query could not be
/// embedded, `RetrievalUnavailable` when the store failed. "Nothing
/// relevant" is `Ok(None)`, never an error.
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    top_k: usize,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>) -> Self {
        Self {
            embedder,
            store,
            top_k: 1,
        }
    }

    /// Number of candidates requested from the store. Only the best is used.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    #[instrument(skip(self, query), fields(store = self.store.store_name(), top_k = self.top_k))]
    pub async fn retrieve(&self, query: &str) -> AppResult<Option<RetrievedChunk>> {
        let vector = self.embedder.embed(query).await.map_err(|e| match e {
            AppError::Embedding(_) => e,
            other => AppError::Embedding(other.to_string()),
        })?;

        if vector.is_empty() {
            warn!(
                provider = self.embedder.provider_name(),
                "Embedding provider returned no vector"
            );
            return Ok(None);
        }

        let matches = self
            .store
            .nearest(&vector, self.top_k)
            .await
            .map_err(|e| match e {
                AppError::RetrievalUnavailable(_) => e,
                other => AppError::RetrievalUnavailable(other.to_string()),
            })?;

        debug!("Store returned {} candidates", matches.len());

        Ok(matches.into_iter().next().map(RetrievedChunk::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VectorMatch;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Debug)]
    enum EmbedBehavior {
        Vector(Vec<f32>),
        Empty,
        Fail,
    }

    #[derive(Debug)]
    struct FakeEmbedder {
        behavior: EmbedBehavior,
        calls: AtomicUsize,
    }

    impl FakeEmbedder {
        fn new(behavior: EmbedBehavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait::async_trait]
    impl EmbeddingProvider for FakeEmbedder {
        fn provider_name(&self) -> &str {
            "fake"
        }
        fn model_name(&self) -> &str {
            "fake"
        }
        fn dimensions(&self) -> usize {
            2
        }
        async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                EmbedBehavior::Vector(v) => Ok(texts.iter().map(|_| v.clone()).collect()),
                EmbedBehavior::Empty => Ok(vec![Vec::new()]),
                EmbedBehavior::Fail => Err(AppError::Embedding("boom".to_string())),
            }
        }
    }

    struct FakeStore {
        result: Result<Vec<VectorMatch>, String>,
        seen: Mutex<Vec<(Vec<f32>, usize)>>,
    }

    impl FakeStore {
        fn returning(matches: Vec<VectorMatch>) -> Arc<Self> {
            Arc::new(Self {
                result: Ok(matches),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                result: Err("connection refused".to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait::async_trait]
    impl VectorStore for FakeStore {
        fn store_name(&self) -> &str {
            "fake"
        }
        async fn nearest(&self, vector: &[f32], limit: usize) -> AppResult<Vec<VectorMatch>> {
            self.seen.lock().unwrap().push((vector.to_vec(), limit));
            self.result
                .clone()
                .map_err(AppError::RetrievalUnavailable)
        }
    }

    fn record(text: &str, url: Option<&str>) -> VectorMatch {
        VectorMatch {
            text: text.to_string(),
            url: url.map(str::to_string),
            score: None,
        }
    }

    #[tokio::test]
    async fn test_returns_first_match() {
        let embedder = FakeEmbedder::new(EmbedBehavior::Vector(vec![0.1, 0.2]));
        let store = FakeStore::returning(vec![
            record("Try a short walk.", Some("http://example.com/walk")),
            record("Second best", None),
        ]);
        let retriever = Retriever::new(embedder, store.clone());

        let chunk = retriever.retrieve("I feel stuck").await.unwrap().unwrap();
        assert_eq!(chunk.text, "Try a short walk.");
        assert_eq!(chunk.source_url.as_deref(), Some("http://example.com/walk"));

        let seen = store.seen.lock().unwrap();
        assert_eq!(seen[0], (vec![0.1, 0.2], 1));
    }

    #[tokio::test]
    async fn test_top_k_passed_to_store() {
        let embedder = FakeEmbedder::new(EmbedBehavior::Vector(vec![1.0, 0.0]));
        let store = FakeStore::returning(vec![record("only", None)]);
        let retriever = Retriever::new(embedder, store.clone()).with_top_k(5);

        retriever.retrieve("q").await.unwrap();
        assert_eq!(store.seen.lock().unwrap()[0].1, 5);
    }

    #[tokio::test]
    async fn test_top_k_zero_clamped() {
        let embedder = FakeEmbedder::new(EmbedBehavior::Vector(vec![1.0]));
        let retriever = Retriever::new(embedder, FakeStore::returning(vec![])).with_top_k(0);
        assert_eq!(retriever.top_k(), 1);
    }

    #[tokio::test]
    async fn test_no_match_is_none() {
        let embedder = FakeEmbedder::new(EmbedBehavior::Vector(vec![1.0, 0.0]));
        let retriever = Retriever::new(embedder, FakeStore::returning(vec![]));
        assert_eq!(retriever.retrieve("q").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_empty_vector_skips_store() {
        let embedder = FakeEmbedder::new(EmbedBehavior::Empty);
        let store = FakeStore::returning(vec![record("unused", None)]);
        let retriever = Retriever::new(embedder, store.clone());

        assert_eq!(retriever.retrieve("q").await.unwrap(), None);
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_embedding_failure_skips_store() {
        let embedder = FakeEmbedder::new(EmbedBehavior::Fail);
        let store = FakeStore::returning(vec![record("unused", None)]);
        let retriever = Retriever::new(embedder.clone(), store.clone());

        let result = retriever.retrieve("q").await;
        assert!(matches!(result, Err(AppError::Embedding(_))));
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_is_unavailable() {
        let embedder = FakeEmbedder::new(EmbedBehavior::Vector(vec![1.0]));
        let retriever = Retriever::new(embedder, FakeStore::failing());

        let result = retriever.retrieve("q").await;
        assert!(matches!(result, Err(AppError::RetrievalUnavailable(_))));
    }

    #[tokio::test]
    async fn test_blank_url_has_no_source() {
        let embedder = FakeEmbedder::new(EmbedBehavior::Vector(vec![1.0]));
        let store = FakeStore::returning(vec![record("text", Some(""))]);
        let retriever = Retriever::new(embedder, store);

        let chunk = retriever.retrieve("q").await.unwrap().unwrap();
        assert_eq!(chunk.source_url, None);
    }
}
