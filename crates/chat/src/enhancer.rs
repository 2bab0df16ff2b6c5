//! Persona post-processing of generated text.

use crate::library::{pick, ResponseLibrary};
use std::sync::Arc;

/// Literal rewrites applied globally, in order.
pub const SUBSTITUTIONS: [(&str, &str); 4] = [
    ("I would recommend", "I think you might like"),
    ("It is important to", "I feel it's important to"),
    ("You should", "Maybe you could"),
    ("Based on the information", "From what I understand"),
];

/// Aside lead-ins. `None` appends nothing.
const ASIDES: [Option<&str>; 4] = [
    Some("By the way, "),
    Some("Just a thought - "),
    Some("Remember, "),
    None,
];

/// Soften directive phrasing into conversational phrasing.
pub fn soften(text: &str) -> String {
    SUBSTITUTIONS
        .iter()
        .fold(text.to_string(), |acc, (from, to)| acc.replace(from, to))
}

/// Citation suffix understood by the chat UI.
pub fn citation(url: &str) -> String {
    format!("\n\n**Source:** [Click here]({})", url)
}

/// Rewrites raw model output into the companion's voice.
#[derive(Debug, Clone)]
pub struct ResponseEnhancer {
    library: Arc<ResponseLibrary>,
}

impl ResponseEnhancer {
    pub fn new(library: Arc<ResponseLibrary>) -> Self {
        Self { library }
    }

    fn aside(&self) -> String {
        match pick(self.library.random(), &ASIDES).copied().flatten() {
            Some(lead) => format!(
                "\n\n{}{}",
                lead,
                self.library.pick_supportive_phrase().to_lowercase()
            ),
            None => String::new(),
        }
    }

    /// Soften, maybe add an aside, then cite `source_url` when present.
    pub fn enhance(&self, raw: &str, source_url: Option<&str>) -> String {
        let mut response = soften(raw);
        response.push_str(&self.aside());

        if let Some(url) = source_url.filter(|url| !url.trim().is_empty()) {
            response.push_str(&citation(url));
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::{FixedIndex, DEFAULT_SUPPORTIVE_PHRASES};

    fn enhancer(index: usize) -> ResponseEnhancer {
        ResponseEnhancer::new(Arc::new(ResponseLibrary::companion_default(Arc::new(
            FixedIndex(index),
        ))))
    }

    #[test]
    fn test_soften_all_patterns() {
        let raw = "I would recommend tea. It is important to rest. You should sleep. Based on the information, yes.";
        assert_eq!(
            soften(raw),
            "I think you might like tea. I feel it's important to rest. Maybe you could sleep. From what I understand, yes."
        );
    }

    #[test]
    fn test_soften_is_global() {
        assert_eq!(
            soften("You should eat. You should drink."),
            "Maybe you could eat. Maybe you could drink."
        );
    }

    #[test]
    fn test_soften_is_case_sensitive() {
        assert_eq!(soften("you should rest."), "you should rest.");
    }

    #[test]
    fn test_soften_passthrough() {
        let raw = "Take a deep breath and go slowly.";
        assert_eq!(soften(raw), raw);
    }

    #[test]
    fn test_no_aside_no_citation() {
        assert_eq!(enhancer(3).enhance("You should rest.", None), "Maybe you could rest.");
    }

    #[test]
    fn test_aside_lowercases_phrase() {
        // Index 1 picks the second aside and the second phrase
        let out = enhancer(1).enhance("Okay.", None);
        assert_eq!(out, "Okay.\n\nJust a thought - i'm here for you.");
    }

    #[test]
    fn test_aside_uses_library_phrase() {
        let out = enhancer(0).enhance("Okay.", None);
        let expected = format!("Okay.\n\nBy the way, {}", DEFAULT_SUPPORTIVE_PHRASES[0].to_lowercase());
        assert_eq!(out, expected);
    }

    #[test]
    fn test_citation_is_last() {
        let out = enhancer(2).enhance("You should rest.", Some("http://example.com"));
        assert!(out.starts_with("Maybe you could rest."));
        assert!(out.contains("\n\nRemember, "));
        assert!(out.ends_with("**Source:** [Click here](http://example.com)"));
    }

    #[test]
    fn test_blank_url_not_cited() {
        let out = enhancer(3).enhance("Fine.", Some("  "));
        assert_eq!(out, "Fine.");
    }
}
