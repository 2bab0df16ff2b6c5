//! Greeting detection.

use crate::types::Intent;

/// Messages answered with a canned greeting. Matched against the whole
/// lowercased, trimmed message, never as a substring.
pub const GREETINGS: [&str; 11] = [
    "hi",
    "hello",
    "hey",
    "hi there",
    "hello there",
    "hey there",
    "greetings",
    "good morning",
    "good afternoon",
    "good evening",
    "howdy",
];

/// Classify a message as a bare greeting or a substantive query.
pub fn classify(text: &str) -> Intent {
    let normalized = text.trim().to_lowercase();
    if GREETINGS.contains(&normalized.as_str()) {
        Intent::Greeting
    } else {
        Intent::Substantive
    }
}
