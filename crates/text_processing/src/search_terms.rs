//! Search-term tokenisation
//!
//! Turns a free-text chat message into the significant terms used by the
//! full-text and keyword search tiers: punctuation is stripped, text is
//! lower-cased and split on whitespace, then stop words and tokens of two
//! characters or fewer are dropped.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Shortest token kept, in characters
pub const MIN_TERM_CHARS: usize = 3;

static PUNCTUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "all", "also", "am", "an", "and", "any", "are", "as", "at", "be",
        "been", "but", "by", "can", "could", "did", "do", "does", "for", "from", "get",
        "got", "had", "has", "have", "hello", "help", "here", "hey", "hi", "how", "i",
        "im", "in", "is", "it", "its", "just", "like", "looking", "me", "my", "near",
        "need", "of", "on", "or", "our", "please", "show", "so", "some", "that", "the",
        "their", "there", "these", "this", "to", "up", "us", "want", "was", "we", "were",
        "what", "when", "where", "which", "who", "will", "with", "would", "you", "your",
    ]
    .into_iter()
    .collect()
});

/// Whether `word` (already lower-cased) is a stop word
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(word)
}

/// Significant search terms of `query`, in message order
///
/// Duplicates are kept; the store treats repeated terms idempotently.
pub fn search_terms(query: &str) -> Vec<String> {
    let stripped = PUNCTUATION.replace_all(query, " ");
    stripped
        .split_whitespace()
        .map(str::to_lowercase)
        .filter(|token| token.chars().count() >= MIN_TERM_CHARS)
        .filter(|token| !is_stop_word(token))
        .collect()
}
