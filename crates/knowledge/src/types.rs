//! Retrieval type definitions.

use serde::{Deserialize, Serialize};

/// One record returned by a nearest-neighbour search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorMatch {
    /// Stored chunk text
    #[serde(default)]
    pub text: String,

    /// Source page the chunk came from, if any
    #[serde(default)]
    pub url: Option<String>,

    /// Store-reported similarity (higher is closer), when available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

/// The single best chunk for a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// Chunk text, embedded verbatim into the prompt
    pub text: String,

    /// Source locator; `None` when the indexed content has no URL
    #[serde(rename = "sourceUrl", skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl From<VectorMatch> for RetrievedChunk {
    fn from(m: VectorMatch) -> Self {
        Self {
            text: m.text,
            // Blank URLs carry no citation
            source_url: m.url.filter(|url| !url.trim().is_empty()),
        }
    }
}

/// A document handed to the in-memory store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedDocument {
    pub text: String,

    #[serde(default)]
    pub url: Option<String>,
}
