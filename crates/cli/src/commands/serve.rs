//! Serve command handler.

use anyhow::Context;
use clap::Args;
use companion_chat::Pipeline;
use companion_core::config::AppConfig;
use std::sync::Arc;

/// Run the HTTP chat endpoint
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to bind (overrides server.bind)
    #[arg(short, long)]
    pub bind: Option<String>,
}

impl ServeCommand {
    /// Execute the serve command.
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        let bind = self.bind.as_deref().unwrap_or(&config.server.bind);

        let pipeline = Pipeline::from_config(config)
            .await
            .context("Failed to initialise the chat pipeline")?;

        companion_chat::serve(Arc::new(pipeline), bind)
            .await
            .with_context(|| format!("Server on {} stopped", bind))
    }
}
