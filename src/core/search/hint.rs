//! Path hint extraction.
//!
//! A question like "how does `src/auth/session.rs` refresh tokens?"
//! names a file. The first token that looks like a path, carries a
//! known code/config extension, or is a well-known file name becomes
//! the hint used to softly boost chunks from matching files.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::indexer::language;

// name.ext with an alphanumeric extension
static FILE_WITH_EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w\-.]*\w\.([A-Za-z0-9]+)$").unwrap());

/// Characters stripped from both ends of a question token
const WRAPPERS: &[char] = &[
    '`', '"', '\'', '(', ')', '[', ']', '<', '>', ',', ';', ':', '?', '!', '*',
];

fn clean_token(raw: &str) -> &str {
    // Trailing periods end sentences: "see `main.rs`."
    raw.trim_start_matches(WRAPPERS)
        .trim_end_matches(|c: char| c == '.' || WRAPPERS.contains(&c))
}

fn looks_like_path(token: &str) -> bool {
    let has_separator = token.contains('/') || token.contains('\\');
    // A lone separator or a URL scheme is not a file path
    has_separator && token.chars().any(|c| c.is_alphanumeric()) && !token.contains("://")
}

fn has_known_extension(token: &str) -> bool {
    FILE_WITH_EXTENSION
        .captures(token)
        .and_then(|c| c.get(1))
        .map(|ext| language::is_known_extension(ext.as_str()))
        .unwrap_or(false)
}

// Bare names only count when written the way repositories spell them
// ("Makefile", "NOTICE"), so prose like "please notice" is not a hint
fn is_named_file(token: &str) -> bool {
    token.starts_with(|c: char| c.is_ascii_uppercase()) && language::is_well_known_file(token)
}

/// Extract the first path-like token from a question.
///
/// Paths and names with a known extension win over bare well-known
/// file names anywhere in the question. The hint is returned
/// lowercased so it can be matched case-insensitively against chunk
/// paths.
pub fn extract_path_hint(question: &str) -> Option<String> {
    let tokens: Vec<&str> = question
        .split_whitespace()
        .map(clean_token)
        .filter(|t| !t.is_empty())
        .collect();

    tokens
        .iter()
        .find(|t| looks_like_path(t) || has_known_extension(t))
        .or_else(|| tokens.iter().find(|t| is_named_file(t)))
        .map(|t| t.replace('\\', "/").to_lowercase())
}

/// Case-insensitive substring match of a hint against a path
pub fn path_matches_hint(path: &str, hint: &str) -> bool {
    path.replace('\\', "/").to_lowercase().contains(hint)
}
