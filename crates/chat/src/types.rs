//! Request and response types for the chat pipeline.

use crate::pipeline::Stage;
use companion_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// A validated user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    text: String,
    user_id: Option<String>,
}

impl Query {
    /// Build a query, rejecting text that is empty after trimming.
    ///
    /// The text itself is kept as given; trimming only decides validity.
    pub fn new(text: impl Into<String>, user_id: Option<String>) -> AppResult<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(AppError::EmptyQuery);
        }
        Ok(Self { text, user_id })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}

/// What kind of message the user sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// A bare greeting with nothing else in it
    Greeting,
    /// Anything that needs retrieval and generation
    Substantive,
}

/// The pipeline's answer to one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    /// Text shown to the user
    pub text: String,

    /// Classified intent
    pub intent: Intent,

    /// Terminal stage: `Completed`, or `Failed` when the catch-all fired
    pub stage: Stage,
}

/// Inbound body of `POST /api/chat`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub query: Option<String>,

    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
}

/// Successful body of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
}
