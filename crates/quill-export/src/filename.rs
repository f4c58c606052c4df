//! Filename derivation shared by both export strategies.
//!
//! Output names are built from the prompt text: characters that are illegal
//! in Windows filenames are stripped, runs of whitespace become single
//! hyphens, and the result is truncated to a reasonable length. A name that
//! sanitizes to nothing falls back to a fixed default.

use std::sync::LazyLock;

use regex::Regex;

/// Characters forbidden in Windows filenames.
static ILLEGAL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*]+"#).expect("illegal-character pattern is valid"));

static WHITESPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Maximum length of a sanitized filename stem, in characters.
pub const MAX_STEM_CHARS: usize = 60;

/// Fallback name for the text-flow document.
pub const DEFAULT_RESPONSE_NAME: &str = "ai-response";

/// Fallback name for the snapshot document.
pub const DEFAULT_SNAPSHOT_NAME: &str = "ai-conversation";

/// Sanitize a prompt into a filename stem.
///
/// Strips illegal characters, collapses whitespace runs to single hyphens,
/// and truncates to [`MAX_STEM_CHARS`]. Returns an empty string if nothing
/// survives; callers apply their own fallback.
pub fn sanitize_stem(name: &str) -> String {
    let stripped = ILLEGAL_CHARS.replace_all(name, "");
    let hyphenated = WHITESPACE_RUNS.replace_all(&stripped, "-");
    hyphenated.chars().take(MAX_STEM_CHARS).collect()
}

/// Filename for the text-flow document: `<stem>-response.pdf`, or
/// `ai-response.pdf` when the prompt sanitizes to nothing.
pub fn response_filename(prompt: &str) -> String {
    let stem = sanitize_stem(prompt);
    if stem.is_empty() {
        format!("{DEFAULT_RESPONSE_NAME}.pdf")
    } else {
        format!("{stem}-response.pdf")
    }
}

/// Filename for the snapshot document: `<stem>.pdf`, or
/// `ai-conversation.pdf` when the prompt sanitizes to nothing.
pub fn snapshot_filename(prompt: &str) -> String {
    let stem = sanitize_stem(prompt);
    if stem.is_empty() {
        format!("{DEFAULT_SNAPSHOT_NAME}.pdf")
    } else {
        format!("{stem}.pdf")
    }
}
