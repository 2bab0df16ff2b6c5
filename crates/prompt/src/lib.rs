//! Prompt system for Companion.
//!
//! This crate turns retrieved context and a user query into the two-message
//! prompt sent to the completion model:
//! - YAML-based persona prompt definitions (with a built-in default)
//! - Handlebars rendering of the user message template

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::PromptComposer;
pub use loader::{list_prompts, load_prompt};
pub use types::{PromptBehavior, PromptDefinition, PromptMessages, NO_CONTEXT_TEXT};
