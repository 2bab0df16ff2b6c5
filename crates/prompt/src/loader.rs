//! Prompt loader for YAML persona definitions.

use crate::types::PromptDefinition;
use companion_core::{AppError, AppResult};
use std::path::Path;

/// Load a prompt definition by ID from the workspace.
///
/// Looks for `<id>.yml` in `.companion/prompts/`.
///
/// # Example
/// ```no_run
/// use companion_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), "companion.persona.gentle")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = workspace_path
        .join(".companion/prompts")
        .join(format!("{}.yml", prompt_id));

    tracing::debug!("Loading prompt from: {:?}", prompt_file);

    if !prompt_file.exists() {
        return Err(AppError::Prompt(format!(
            "Prompt file not found: {:?}",
            prompt_file
        )));
    }

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse prompt YAML {:?}: {}",
            prompt_file, e
        ))
    })?;

    validate_prompt(&definition)?;

    tracing::info!("Loaded prompt: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// List all available prompt IDs in the workspace.
pub fn list_prompts(workspace_path: &Path) -> AppResult<Vec<String>> {
    let prompts_dir = workspace_path.join(".companion/prompts");

    if !prompts_dir.exists() {
        return Ok(Vec::new());
    }

    let mut prompt_ids = Vec::new();

    for entry in walkdir::WalkDir::new(&prompts_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("yml") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                prompt_ids.push(stem.to_string());
            }
        }
    }

    prompt_ids.sort();
    Ok(prompt_ids)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.system.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt system instruction cannot be empty".to_string(),
        ));
    }

    if def.template.is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.template.contains("{{query}}") {
        return Err(AppError::Prompt(format!(
            "Prompt template for '{}' must reference {{{{query}}}}",
            def.id
        )));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_prompt(dir: &Path, id: &str, template: &str) -> PathBuf {
        let prompts_dir = dir.join(".companion/prompts");
        fs::create_dir_all(&prompts_dir).unwrap();

        let content = format!(
            r#"
id: {}
title: "Gentle"
apiVersion: "1.0"
createdBy: test
behavior:
  tone: warm
  style: gentle
system: "You are gentle."
template: "{}"
"#,
            id, template
        );

        let file_path = prompts_dir.join(format!("{}.yml", id));
        fs::write(&file_path, content).unwrap();
        file_path
    }

    #[test]
    fn test_load_valid_prompt() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), "gentle", "{{context}} {{query}}");

        let prompt = load_prompt(temp_dir.path(), "gentle").unwrap();
        assert_eq!(prompt.id, "gentle");
        assert_eq!(prompt.system, "You are gentle.");
    }

    #[test]
    fn test_load_nonexistent_prompt() {
        let temp_dir = TempDir::new().unwrap();
        assert!(load_prompt(temp_dir.path(), "nonexistent").is_err());
    }

    #[test]
    fn test_template_must_use_query() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), "broken", "{{context}} only");

        let err = load_prompt(temp_dir.path(), "broken").unwrap_err();
        assert!(err.to_string().contains("{{query}}"));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let prompts_dir = temp_dir.path().join(".companion/prompts");
        fs::create_dir_all(&prompts_dir).unwrap();
        fs::write(prompts_dir.join("invalid.yml"), "invalid: yaml: content:").unwrap();

        assert!(load_prompt(temp_dir.path(), "invalid").is_err());
    }

    #[test]
    fn test_list_prompts() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), "prompt2", "{{query}}");
        write_prompt(temp_dir.path(), "prompt1", "{{query}}");

        let prompts = list_prompts(temp_dir.path()).unwrap();
        assert_eq!(prompts, vec!["prompt1".to_string(), "prompt2".to_string()]);
    }

    #[test]
    fn test_list_prompts_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        assert!(list_prompts(temp_dir.path()).unwrap().is_empty());
    }
}
