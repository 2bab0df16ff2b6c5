//! Fake providers with call counters and scripted failures.

use crate::generator::Generator;
use crate::library::{FixedIndex, ResponseLibrary};
use crate::pipeline::Pipeline;
use companion_core::{AppError, AppResult};
use companion_knowledge::{EmbeddingProvider, Retriever, VectorMatch, VectorStore};
use companion_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use companion_prompt::PromptComposer;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum Embed {
    Vector(Vec<f32>),
    Nothing,
    Fail,
}

#[derive(Debug)]
pub struct FakeEmbedder {
    behavior: Embed,
    pub calls: AtomicUsize,
}

#[async_trait::async_trait]
impl EmbeddingProvider for FakeEmbedder {
    fn provider_name(&self) -> &str {
        "fake"
    }

    fn model_name(&self) -> &str {
        "fake-embed"
    }

    fn dimensions(&self) -> usize {
        3
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Embed::Vector(v) => Ok(texts.iter().map(|_| v.clone()).collect()),
            Embed::Nothing => Ok(Vec::new()),
            Embed::Fail => Err(AppError::Embedding("connection refused".to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Lookup {
    Found(Vec<VectorMatch>),
    Fail,
}

pub struct FakeStore {
    behavior: Lookup,
    pub calls: AtomicUsize,
}

#[async_trait::async_trait]
impl VectorStore for FakeStore {
    fn store_name(&self) -> &str {
        "fake"
    }

    async fn nearest(&self, _vector: &[f32], limit: usize) -> AppResult<Vec<VectorMatch>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Lookup::Found(matches) => Ok(matches.iter().take(limit).cloned().collect()),
            Lookup::Fail => Err(AppError::RetrievalUnavailable(
                "weaviate returned 503".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Complete {
    Text(String),
    Fail,
    Panic,
    /// Returns an error the pipeline does not model
    Unexpected,
}

pub struct FakeLlm {
    behavior: Complete,
    pub requests: Mutex<Vec<LlmRequest>>,
}

impl FakeLlm {
    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_user_message(&self) -> String {
        let requests = self.requests.lock().unwrap();
        requests
            .last()
            .and_then(|r| r.messages.last())
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl LlmClient for FakeLlm {
    fn provider_name(&self) -> &str {
        "fake"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.behavior {
            Complete::Text(text) => Ok(LlmResponse {
                content: text.clone(),
                model: request.model.clone(),
                usage: LlmUsage::new(20, 10),
            }),
            Complete::Fail => Err(AppError::Llm("request timed out".to_string())),
            Complete::Panic => panic!("provider exploded"),
            Complete::Unexpected => Err(AppError::Other("socket closed".to_string())),
        }
    }
}

/// A pipeline wired to fakes, with handles for asserting on calls.
pub struct Harness {
    pub pipeline: Pipeline,
    pub embedder: Arc<FakeEmbedder>,
    pub store: Arc<FakeStore>,
    pub llm: Arc<FakeLlm>,
}

impl Harness {
    pub fn new(embed: Embed, lookup: Lookup, complete: Complete) -> Self {
        Self::with_index(embed, lookup, complete, 3)
    }

    /// `index` drives every random pick. 3 selects "no aside".
    pub fn with_index(embed: Embed, lookup: Lookup, complete: Complete, index: usize) -> Self {
        let embedder = Arc::new(FakeEmbedder {
            behavior: embed,
            calls: AtomicUsize::new(0),
        });
        let store = Arc::new(FakeStore {
            behavior: lookup,
            calls: AtomicUsize::new(0),
        });
        let llm = Arc::new(FakeLlm {
            behavior: complete,
            requests: Mutex::new(Vec::new()),
        });

        let library = Arc::new(ResponseLibrary::companion_default(Arc::new(FixedIndex(
            index,
        ))));
        let retriever = Retriever::new(embedder.clone(), store.clone());
        let generator = Generator::new(llm.clone(), "llama3-70b-8192");
        let composer = PromptComposer::companion_default().unwrap();

        Self {
            pipeline: Pipeline::new(library, retriever, composer, generator),
            embedder,
            store,
            llm,
        }
    }

    pub fn embed_calls(&self) -> usize {
        self.embedder.calls.load(Ordering::SeqCst)
    }

    pub fn store_calls(&self) -> usize {
        self.store.calls.load(Ordering::SeqCst)
    }

    pub fn downstream_calls(&self) -> usize {
        self.embed_calls() + self.store_calls() + self.llm.calls()
    }
}

pub fn found(text: &str, url: Option<&str>) -> Lookup {
    Lookup::Found(vec![VectorMatch {
        text: text.to_string(),
        url: url.map(str::to_string),
        score: Some(0.9),
    }])
}

pub fn vector() -> Embed {
    Embed::Vector(vec![0.1, 0.2, 0.3])
}

pub fn says(text: &str) -> Complete {
    Complete::Text(text.to_string())
}
