//! Heuristic text cleaning for scraped source text.
//!
//! Two cleaners exist:
//! - [`clean_encyclopedia_text`] strips Wikipedia artifacts (citation markers,
//!   section headings, template residue) and never rejects a document.
//! - [`clean_generic_text`] handles news and web pages. It rejects a page
//!   outright (returns `""`) when it looks like a bot check or boilerplate,
//!   and otherwise drops short navigation-like lines.
//!
//! Cleaning is heuristic; it does not try to understand the text.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::models::SourceKind;

/// Phrases whose presence marks a whole page as unusable.
pub const JUNK_PHRASES: [&str; 6] = [
    "Verifying you are human",
    "needs to review the security of your connection",
    "Enable JavaScript and cookies to continue",
    "This article needs additional citations for verification",
    "Was this article helpful?",
    "Subscribe to our newsletter",
];

/// Lines shorter than this (in characters) are treated as navigation noise.
const MIN_LINE_CHARS: usize = 50;

static INLINE_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\d*\]|\[edit\]|\[citation needed\]").unwrap());

static EXCESS_NEWLINES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Run the cleaner that matches `kind`.
pub fn clean_for_source(kind: SourceKind, raw: &str) -> String {
    match kind {
        SourceKind::Encyclopedia => clean_encyclopedia_text(raw),
        SourceKind::NewsSearch | SourceKind::WebSearch => clean_generic_text(raw),
    }
}

/// Remove Wikipedia-specific artifacts from article text.
///
/// # Rules
///
/// 1. Strip `[12]`, `[]`, `[edit]` and `[citation needed]` markers, repeating
///    until none remain (so `[[1]]` goes away too)
/// 2. Drop lines that are `==Heading==` style section titles
/// 3. Drop lines starting with `|` (template and table residue)
/// 4. Rejoin the rest with `\n`, keeping interior blank lines, and trim the
///    trailing whitespace of the document
pub fn clean_encyclopedia_text(text: &str) -> String {
    let stripped = strip_inline_markers(text);

    let kept: Vec<&str> = stripped
        .split('\n')
        .filter(|line| {
            let trimmed = line.trim();
            let is_heading = trimmed.starts_with("==") && trimmed.ends_with("==");
            !is_heading && !trimmed.starts_with('|')
        })
        .collect();

    kept.join("\n").trim_end().to_string()
}

fn strip_inline_markers(text: &str) -> Cow<'_, str> {
    let mut current = Cow::Borrowed(text);
    while INLINE_MARKER_RE.is_match(&current) {
        current = Cow::Owned(INLINE_MARKER_RE.replace_all(&current, "").into_owned());
    }
    current
}

/// Clean scraped news or web page text.
///
/// Returns `""` when any of [`JUNK_PHRASES`] occurs anywhere in `text`: such a
/// page is almost always a CAPTCHA or consent wall, so nothing on it is kept.
/// Otherwise keeps trimmed lines that are at least 50 characters long or
/// contain a curly brace, and normalizes runs of blank lines.
pub fn clean_generic_text(text: &str) -> String {
    if let Some(phrase) = JUNK_PHRASES.iter().find(|p| text.contains(*p)) {
        debug!(%phrase, "Junk phrase found; discarding content");
        return String::new();
    }

    let kept: Vec<&str> = text
        .split('\n')
        .map(str::trim)
        .filter(|line| {
            line.chars().count() >= MIN_LINE_CHARS || line.contains('{') || line.contains('}')
        })
        .collect();

    let joined = kept.join("\n");
    EXCESS_NEWLINES_RE
        .replace_all(&joined, "\n\n")
        .trim()
        .to_string()
}
