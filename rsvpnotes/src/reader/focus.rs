//! Fixation point within a displayed word.

use serde::Serialize;

/// Character index the eye should anchor on for a word of `len` characters
pub fn focus_index(len: usize) -> usize {
    match len {
        0 | 1 => 0,
        2..=5 => 1,
        6..=9 => 2,
        10..=13 => 3,
        _ => 4,
    }
}

/// A token cut around its focus character
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FocusSplit {
    pub prefix: String,
    pub focus: String,
    pub suffix: String,
}

impl FocusSplit {
    pub fn new(token: &str) -> Self {
        let chars: Vec<char> = token.chars().collect();
        if chars.is_empty() {
            return Self::default();
        }

        let at = focus_index(chars.len());
        Self {
            prefix: chars[..at].iter().collect(),
            focus: chars[at].to_string(),
            suffix: chars[at + 1..].iter().collect(),
        }
    }
}
