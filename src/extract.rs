//! Final-answer extraction from generated reasoning text
//!
//! The model is instructed to put everything user-facing after a literal
//! `Final Answer:` marker, but local models drift. These functions degrade
//! through three tiers: marker section, last conclusion-looking paragraph,
//! last non-blank line.

use once_cell::sync::Lazy;
use regex::Regex;

/// The marker separating internal reasoning from the user-visible answer.
pub const FINAL_ANSWER_MARKER: &str = "Final Answer:";

/// Paragraph prefixes that flag internal reasoning rather than a conclusion.
const REASONING_PREFIXES: &[&str] = &["Thought:", "Analysis:", "Reflection:", "Next Step:"];

static MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Final Answer:").expect("marker regex is valid"));

/// Returns true if the marker occurs anywhere in the text, case-insensitively.
pub fn contains_marker(text: &str) -> bool {
    MARKER_RE.is_match(text)
}

/// Extract the user-facing answer from reasoning text.
///
/// If the marker is present, returns the trimmed text after it up to the
/// next blank line (possibly empty — the caller decides whether an empty
/// marker section counts as a conclusion). Without a marker, falls back to
/// the last paragraph that does not start with a reasoning prefix, then to
/// the last non-blank line, then to an empty string.
pub fn extract_answer(text: &str) -> String {
    // Tier 1: marker section
    if let Some(m) = MARKER_RE.find(text) {
        let rest = &text[m.end()..];
        let section = match rest.find("\n\n") {
            Some(pos) => &rest[..pos],
            None => rest,
        };
        return section.trim().to_string();
    }

    // Tier 2: last paragraph that reads like a conclusion
    for paragraph in text.split("\n\n").collect::<Vec<_>>().into_iter().rev() {
        if !paragraph.trim().is_empty()
            && !REASONING_PREFIXES.iter().any(|p| paragraph.starts_with(p))
        {
            return paragraph.trim().to_string();
        }
    }

    // Tier 3: last non-blank line
    for line in text.trim().lines().rev() {
        if !line.trim().is_empty() {
            return line.trim().to_string();
        }
    }

    String::new()
}
