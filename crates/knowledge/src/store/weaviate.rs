//! Weaviate-backed [`VectorStore`].
//!
//! Issues a GraphQL `Get` with `nearVector` against `{endpoint}/v1/graphql`
//! and reads `text` and `url` from the configured class.

use super::VectorStore;
use crate::types::VectorMatch;
use async_trait::async_trait;
use companion_core::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
struct GraphQlRequest {
    query: String,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    #[serde(default)]
    message: String,
}

/// Weaviate store client.
#[derive(Debug, Clone)]
pub struct WeaviateStore {
    client: Client,
    endpoint: String,
    class_name: String,
    api_key: Option<String>,
}

impl WeaviateStore {
    pub fn new(
        endpoint: &str,
        class_name: &str,
        api_key: Option<&str>,
        timeout: Duration,
    ) -> AppResult<Self> {
        if !is_graphql_name(class_name) {
            return Err(AppError::Config(format!(
                "Invalid Weaviate class name: '{}'",
                class_name
            )));
        }

        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            AppError::RetrievalUnavailable(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            class_name: class_name.to_string(),
            api_key: api_key.map(str::to_string),
        })
    }

    fn build_query(&self, vector: &[f32], limit: usize) -> String {
        let vector = vector
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");

        format!(
            "{{ Get {{ {}(nearVector: {{vector: [{}]}}, limit: {}) {{ text url _additional {{ distance }} }} }} }}",
            self.class_name, vector, limit
        )
    }
}

/// GraphQL names are `[_A-Za-z][_0-9A-Za-z]*`.
fn is_graphql_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// Pull matches out of `data.Get.<class>`.
///
/// A missing path or an empty list yields no matches. Records without a
/// string `text` are skipped.
fn parse_matches(data: &Value, class_name: &str) -> Vec<VectorMatch> {
    let Some(records) = data
        .get("Get")
        .and_then(|get| get.get(class_name))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    records
        .iter()
        .filter_map(|record| {
            let text = record.get("text")?.as_str()?.to_string();
            let url = record
                .get("url")
                .and_then(Value::as_str)
                .map(str::to_string);
            let score = record
                .pointer("/_additional/distance")
                .and_then(Value::as_f64)
                .map(|d| 1.0 - d as f32);
            Some(VectorMatch { text, url, score })
        })
        .collect()
}

#[async_trait]
impl VectorStore for WeaviateStore {
    fn store_name(&self) -> &str {
        "weaviate"
    }

    async fn nearest(&self, vector: &[f32], limit: usize) -> AppResult<Vec<VectorMatch>> {
        let url = format!("{}/v1/graphql", self.endpoint);
        debug!("Querying {} for {} nearest {}", url, limit, self.class_name);

        let mut request = self.client.post(&url).json(&GraphQlRequest {
            query: self.build_query(vector, limit),
        });
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            AppError::RetrievalUnavailable(format!("Failed to reach Weaviate: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::RetrievalUnavailable(format!(
                "Weaviate error ({}): {}",
                status, body
            )));
        }

        let body: GraphQlResponse = response.json().await.map_err(|e| {
            AppError::RetrievalUnavailable(format!("Failed to parse Weaviate response: {}", e))
        })?;

        if !body.errors.is_empty() {
            let messages: Vec<&str> = body.errors.iter().map(|e| e.message.as_str()).collect();
            return Err(AppError::RetrievalUnavailable(format!(
                "Weaviate query failed: {}",
                messages.join("; ")
            )));
        }

        Ok(body
            .data
            .map(|data| parse_matches(&data, &self.class_name))
            .unwrap_or_default())
    }
}
