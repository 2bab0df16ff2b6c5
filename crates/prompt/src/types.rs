//! Prompt types for Companion.
//!
//! This module defines the domain entities for the prompt system.

use serde::{Deserialize, Serialize};

/// Context text used when retrieval produced nothing.
pub const NO_CONTEXT_TEXT: &str = "No relevant content found.";

const COMPANION_SYSTEM: &str = "You are a caring, empathetic companion chatbot. \
Respond in a warm, friendly manner using conversational language. \
Show genuine concern for the user's emotions and well-being. \
Use the user's name if available. \
Keep responses helpful but also supportive, as if talking to a friend.";

const COMPANION_TEMPLATE: &str = "Context information: {{context}}\n\n\
The user said: {{query}}\n\n\
Respond in a caring and supportive way while addressing their query.";

/// A persona prompt definition loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Creator identifier
    #[serde(rename = "createdBy", default)]
    pub created_by: String,

    /// Behavioral settings
    pub behavior: PromptBehavior,

    /// System instruction, identical for every request
    pub system: String,

    /// User message template with `{{context}}` and `{{query}}` placeholders
    pub template: String,
}

impl PromptDefinition {
    /// The built-in companion persona.
    pub fn companion_default() -> Self {
        Self {
            id: "companion.persona.default".to_string(),
            title: "Caring companion".to_string(),
            api_version: "1.0".to_string(),
            created_by: "companion".to_string(),
            behavior: PromptBehavior {
                tone: "warm".to_string(),
                style: "conversational".to_string(),
            },
            system: COMPANION_SYSTEM.to_string(),
            template: COMPANION_TEMPLATE.to_string(),
        }
    }
}

/// Behavioral settings for prompt execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptBehavior {
    /// Tone (e.g., "warm", "professional")
    pub tone: String,

    /// Style (e.g., "conversational", "concise")
    pub style: String,
}

/// The composed system + user message pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessages {
    /// System message (persona instruction)
    pub system: String,

    /// User message (context and query)
    pub user: String,

    /// Source prompt ID
    #[serde(rename = "sourcePromptId")]
    pub source_prompt_id: String,
}
