//! Chat command handler.
//!
//! Sends one message through the pipeline and prints the reply.

use anyhow::Context;
use clap::Args;
use companion_chat::Pipeline;
use companion_core::config::AppConfig;

/// Send one message to the companion
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// The message to send
    pub query: String,

    /// User identifier attached to the request's logs
    #[arg(short, long)]
    pub user_id: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ChatCommand {
    /// Execute the chat command.
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        tracing::info!("Executing chat command");

        let pipeline = Pipeline::from_config(config)
            .await
            .context("Failed to initialise the chat pipeline")?;

        let reply = pipeline.handle(&self.query, self.user_id.clone()).await?;

        if self.json {
            let output = serde_json::json!({
                "response": reply.text,
                "intent": reply.intent,
                "stage": reply.stage,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", reply.text);
        }

        Ok(())
    }
}
