//! Per-word display time.
//!
//! `delay` is a pure function of the token, the speed and the adaptation
//! toggles. It places no ceiling on the speed; bounds belong to settings
//! validation and the training ramp.

use crate::config::{
    CLAUSE_PAUSE_MS, COMPLEXITY_MULTIPLIER, DASH_PAUSE_MS, LONG_WORD_PENALTY_MS,
    LONG_WORD_THRESHOLD, SENTENCE_PAUSE_MS,
};
use serde::{Deserialize, Serialize};

/// Closed-class words that read fast: articles, pronouns, auxiliaries,
/// prepositions and conjunctions.
pub const COMMON_WORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be", "because",
    "been", "before", "being", "but", "by", "can", "could", "did", "do", "does", "for", "from",
    "had", "has", "have", "he", "her", "here", "him", "his", "how", "i", "if", "in", "into",
    "is", "it", "its", "just", "me", "more", "my", "no", "not", "now", "of", "on", "one", "only",
    "or", "our", "out", "over", "said", "she", "should", "so", "some", "than", "that", "the",
    "their", "them", "then", "there", "these", "they", "this", "those", "through", "to", "up",
    "upon", "us", "very", "was", "we", "were", "what", "when", "where", "which", "while", "who",
    "whom", "why", "will", "with", "would", "you", "your", "yes", "am", "may", "might", "must",
];

/// Which adaptation rules apply on top of the base speed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PacingToggles {
    pub adapt_word_length: bool,
    pub adapt_punctuation: bool,
    pub adapt_complexity: bool,
}

impl PacingToggles {
    pub const ALL: Self = Self {
        adapt_word_length: true,
        adapt_punctuation: true,
        adapt_complexity: true,
    };
}

/// Display time for `token` in milliseconds at `wpm` words per minute.
///
/// Applied in order: long-word addition, trailing punctuation addition,
/// then the complexity multiplier on the running total.
pub fn delay(token: &str, wpm: f64, toggles: PacingToggles) -> f64 {
    let mut delay = 60_000.0 / wpm;

    if toggles.adapt_word_length {
        let len = strip_non_word(token).chars().count();
        delay += len.saturating_sub(LONG_WORD_THRESHOLD) as f64 * LONG_WORD_PENALTY_MS;
    }

    if toggles.adapt_punctuation {
        delay += punctuation_pause(token);
    }

    if toggles.adapt_complexity && !is_common_word(token) {
        delay *= COMPLEXITY_MULTIPLIER;
    }

    delay
}

/// Pause owed to the token's final character
pub fn punctuation_pause(token: &str) -> f64 {
    match token.chars().last() {
        Some('.' | '!' | '?') => SENTENCE_PAUSE_MS,
        Some(',' | ';' | ':') => CLAUSE_PAUSE_MS,
        Some('-' | '—') => DASH_PAUSE_MS,
        _ => 0.0,
    }
}

/// Whether the token, stripped and lower-cased, is in [`COMMON_WORDS`]
pub fn is_common_word(token: &str) -> bool {
    let word = strip_non_word(token).to_lowercase();
    COMMON_WORDS.contains(&word.as_str())
}

/// Keep only word characters: Unicode letters and digits, plus underscore
fn strip_non_word(token: &str) -> String {
    token
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}
