//! Prompt composer: renders the persona definition against context and query.

use crate::types::{PromptDefinition, PromptMessages, NO_CONTEXT_TEXT};
use companion_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

const USER_TEMPLATE: &str = "user";

/// Builds the fixed two-message prompt for every substantive query.
///
/// The template is parsed once at construction, so a malformed custom
/// persona is rejected at startup instead of on the first request.
///
/// # Example
/// ```
/// use companion_prompt::{PromptComposer, PromptDefinition};
///
/// let composer = PromptComposer::new(PromptDefinition::companion_default()).unwrap();
/// let messages = composer.compose(Some("Rest helps."), "I'm tired").unwrap();
/// assert!(messages.user.contains("The user said: I'm tired"));
/// ```
#[derive(Clone)]
pub struct PromptComposer {
    definition: PromptDefinition,
    registry: Handlebars<'static>,
}

impl PromptComposer {
    /// Create a composer for `definition`, validating its template.
    pub fn new(definition: PromptDefinition) -> AppResult<Self> {
        let mut registry = Handlebars::new();

        // Plain text, not HTML
        registry.register_escape_fn(handlebars::no_escape);

        registry
            .register_template_string(USER_TEMPLATE, &definition.template)
            .map_err(|e| {
                AppError::Prompt(format!(
                    "Failed to register template for '{}': {}",
                    definition.id, e
                ))
            })?;

        tracing::debug!("Prompt composer ready: {}", definition.id);

        Ok(Self {
            definition,
            registry,
        })
    }

    /// Composer for the built-in companion persona.
    pub fn companion_default() -> AppResult<Self> {
        Self::new(PromptDefinition::companion_default())
    }

    /// The definition this composer renders.
    pub fn definition(&self) -> &PromptDefinition {
        &self.definition
    }

    /// Compose the system and user messages.
    ///
    /// `context` is embedded verbatim; `None` becomes [`NO_CONTEXT_TEXT`].
    /// The system message never varies between calls.
    pub fn compose(&self, context: Option<&str>, query: &str) -> AppResult<PromptMessages> {
        let mut variables = HashMap::new();
        variables.insert("context", context.unwrap_or(NO_CONTEXT_TEXT));
        variables.insert("query", query);

        let user = self
            .registry
            .render(USER_TEMPLATE, &variables)
            .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

        Ok(PromptMessages {
            system: self.definition.system.clone(),
            user,
            source_prompt_id: self.definition.id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PromptBehavior;

    fn custom_definition(template: &str) -> PromptDefinition {
        PromptDefinition {
            id: "test.prompt".to_string(),
            title: "Test".to_string(),
            api_version: "1.0".to_string(),
            created_by: "test".to_string(),
            behavior: PromptBehavior {
                tone: "warm".to_string(),
                style: "concise".to_string(),
            },
            system: "Be kind.".to_string(),
            template: template.to_string(),
        }
    }

    #[test]
    fn test_compose_default() {
        let composer = PromptComposer::companion_default().unwrap();
        let messages = composer
            .compose(Some("Sleep matters."), "hi, I feel anxious about work")
            .unwrap();

        assert_eq!(
            messages.user,
            "Context information: Sleep matters.\n\n\
             The user said: hi, I feel anxious about work\n\n\
             Respond in a caring and supportive way while addressing their query."
        );
        assert_eq!(messages.source_prompt_id, "companion.persona.default");
    }

    #[test]
    fn test_compose_without_context() {
        let composer = PromptComposer::companion_default().unwrap();
        let messages = composer.compose(None, "hello friend").unwrap();
        assert!(messages
            .user
            .starts_with("Context information: No relevant content found."));
    }

    #[test]
    fn test_system_message_is_invariant() {
        let composer = PromptComposer::companion_default().unwrap();
        let a = composer.compose(Some("a"), "first").unwrap();
        let b = composer.compose(None, "second").unwrap();
        assert_eq!(a.system, b.system);
        assert_ne!(a.user, b.user);
    }

    #[test]
    fn test_context_is_not_escaped() {
        let composer = PromptComposer::companion_default().unwrap();
        let messages = composer.compose(Some("<b>\"quotes\" & tags</b>"), "q").unwrap();
        assert!(messages.user.contains("<b>\"quotes\" & tags</b>"));
    }

    #[test]
    fn test_custom_template() {
        let composer = PromptComposer::new(custom_definition("Q: {{query}} | C: {{context}}")).unwrap();
        let messages = composer.compose(Some("ctx"), "why?").unwrap();
        assert_eq!(messages.user, "Q: why? | C: ctx");
        assert_eq!(messages.system, "Be kind.");
    }

    #[test]
    fn test_malformed_template_rejected() {
        let result = PromptComposer::new(custom_definition("{{#if query}}unclosed"));
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }
}
