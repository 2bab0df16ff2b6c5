//! Prompts command handler.
//!
//! Lists the built-in persona and every prompt under `.companion/prompts/`,
//! marking the one `persona.promptFile` selects.

use clap::Args;
use companion_core::config::AppConfig;
use companion_prompt::{list_prompts, load_prompt, PromptDefinition};
use serde::Serialize;
use std::path::Path;

/// List persona prompts
#[derive(Args, Debug)]
pub struct PromptsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct PromptEntry {
    pub id: String,
    pub title: Option<String>,
    #[serde(rename = "builtIn")]
    pub built_in: bool,
    pub active: bool,
    /// Load or validation error, when the file is unusable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Collect the prompts visible from `workspace`.
pub fn collect_prompts(workspace: &Path, active: Option<&str>) -> anyhow::Result<Vec<PromptEntry>> {
    let default = PromptDefinition::companion_default();
    let mut entries = vec![PromptEntry {
        active: active.is_none(),
        id: default.id,
        title: Some(default.title),
        built_in: true,
        error: None,
    }];

    for id in list_prompts(workspace)? {
        let (title, error) = match load_prompt(workspace, &id) {
            Ok(def) => (Some(def.title), None),
            Err(e) => (None, Some(e.to_string())),
        };
        entries.push(PromptEntry {
            active: active == Some(id.as_str()),
            id,
            title,
            built_in: false,
            error,
        });
    }

    Ok(entries)
}

impl PromptsCommand {
    /// Execute the prompts command.
    pub fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        let entries = collect_prompts(&config.workspace, config.persona.prompt_file.as_deref())?;
        tracing::debug!("Found {} prompts", entries.len());

        if self.json {
            println!("{}", serde_json::to_string_pretty(&entries)?);
            return Ok(());
        }

        for entry in &entries {
            let marker = if entry.active { "*" } else { " " };
            let detail = match (&entry.title, &entry.error) {
                (_, Some(error)) => format!("invalid: {}", error),
                (Some(title), None) if entry.built_in => format!("{} (built-in)", title),
                (Some(title), None) => title.clone(),
                (None, None) => String::new(),
            };
            println!("{} {:<32} {}", marker, entry.id, detail);
        }

        Ok(())
    }
}
