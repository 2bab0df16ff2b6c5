//! Retrieval for Companion.
//!
//! Embeds a query through an external provider and looks up the nearest
//! indexed chunk in a vector store. Index creation and ingestion belong to
//! another system; this crate only reads.

pub mod embeddings;
pub mod retriever;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use embeddings::{create_provider, EmbeddingProvider};
pub use retriever::Retriever;
pub use store::{create_store, InMemoryStore, VectorStore, WeaviateStore};
pub use types::{RetrievedChunk, SeedDocument, VectorMatch};
