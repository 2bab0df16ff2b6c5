//! Companion chat pipeline.
//!
//! Turns a user's message into a warm reply:
//! - Bare greetings are answered from the [`ResponseLibrary`]
//! - Everything else goes through retrieval, prompt composition, generation,
//!   and persona enhancement
//!
//! Every failure other than an empty query becomes conversational text.

pub mod enhancer;
pub mod generator;
pub mod intent;
pub mod library;
pub mod pipeline;
pub mod server;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use enhancer::ResponseEnhancer;
pub use generator::Generator;
pub use intent::classify;
pub use library::{FixedIndex, RandomSource, ResponseLibrary, ThreadRandom};
pub use pipeline::{Pipeline, Stage};
pub use server::{router, serve};
pub use types::{ChatReply, ChatRequest, Intent, Query, Reply};
