//! Canned persona content and the randomness that picks from it.

use companion_core::config::PersonaSettings;
use companion_core::{AppError, AppResult};
use rand::Rng;
use std::sync::Arc;

/// Greeting variants returned for bare greetings.
pub const DEFAULT_GREETINGS: [&str; 4] = [
    "Hi there! Welcome to your personal companion built by Deepanshu. How are you feeling today?",
    "Hello! I'm your personal companion created by Deepanshu. I'm here to chat and support you. What's on your mind?",
    "Welcome to your personal companion built by Deepanshu! I'm here for you - what would you like to talk about today?",
    "Hey friend! Welcome to your personal companion built by Deepanshu. How can I brighten your day?",
];

/// Phrases mixed into generated replies as supportive asides.
pub const DEFAULT_SUPPORTIVE_PHRASES: [&str; 9] = [
    "I understand how you feel.",
    "I'm here for you.",
    "That sounds challenging, but I believe in you.",
    "It's okay to feel that way.",
    "I'm listening.",
    "You're doing great.",
    "Let's work through this together.",
    "Your feelings are valid.",
    "I appreciate you sharing that with me.",
];

/// Source of uniformly distributed indices.
pub trait RandomSource: Send + Sync {
    /// Return an index in `0..len`. `len` is never zero.
    fn index(&self, len: usize) -> usize;
}

/// Thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn index(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Always returns the same index, wrapped into range.
#[derive(Debug, Clone, Copy)]
pub struct FixedIndex(pub usize);

impl RandomSource for FixedIndex {
    fn index(&self, len: usize) -> usize {
        self.0 % len
    }
}

/// Pick one element of a non-empty slice.
pub(crate) fn pick<'a, T>(random: &dyn RandomSource, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(random.index(items.len()).min(items.len() - 1))
}

/// Read-only greeting and supportive-phrase tables.
///
/// Both lists are guaranteed non-empty, so picks always return a member.
#[derive(Clone)]
pub struct ResponseLibrary {
    greetings: Vec<String>,
    supportive_phrases: Vec<String>,
    random: Arc<dyn RandomSource>,
}

impl ResponseLibrary {
    pub fn new(
        greetings: Vec<String>,
        supportive_phrases: Vec<String>,
        random: Arc<dyn RandomSource>,
    ) -> AppResult<Self> {
        if greetings.is_empty() {
            return Err(AppError::Config("greeting list cannot be empty".to_string()));
        }
        if supportive_phrases.is_empty() {
            return Err(AppError::Config(
                "supportive phrase list cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            greetings,
            supportive_phrases,
            random,
        })
    }

    /// The built-in persona tables.
    pub fn companion_default(random: Arc<dyn RandomSource>) -> Self {
        Self {
            greetings: DEFAULT_GREETINGS.iter().map(|s| s.to_string()).collect(),
            supportive_phrases: DEFAULT_SUPPORTIVE_PHRASES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            random,
        }
    }

    /// Built-in tables with any configured overrides applied.
    pub fn from_settings(settings: &PersonaSettings, random: Arc<dyn RandomSource>) -> AppResult<Self> {
        let defaults = Self::companion_default(random.clone());
        Self::new(
            settings.greetings.clone().unwrap_or(defaults.greetings),
            settings
                .supportive_phrases
                .clone()
                .unwrap_or(defaults.supportive_phrases),
            random,
        )
    }

    pub fn pick_greeting(&self) -> &str {
        pick(self.random.as_ref(), &self.greetings)
            .map(String::as_str)
            .unwrap_or(DEFAULT_GREETINGS[0])
    }

    pub fn pick_supportive_phrase(&self) -> &str {
        pick(self.random.as_ref(), &self.supportive_phrases)
            .map(String::as_str)
            .unwrap_or(DEFAULT_SUPPORTIVE_PHRASES[0])
    }

    pub fn greetings(&self) -> &[String] {
        &self.greetings
    }

    pub fn supportive_phrases(&self) -> &[String] {
        &self.supportive_phrases
    }

    pub(crate) fn random(&self) -> &dyn RandomSource {
        self.random.as_ref()
    }
}

impl std::fmt::Debug for ResponseLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseLibrary")
            .field("greetings", &self.greetings.len())
            .field("supportive_phrases", &self.supportive_phrases.len())
            .finish()
    }
}
