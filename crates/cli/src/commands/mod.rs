//! Command handlers for the Companion CLI.

pub mod chat;
pub mod prompts;
pub mod serve;

pub use chat::ChatCommand;
pub use prompts::PromptsCommand;
pub use serve::ServeCommand;
