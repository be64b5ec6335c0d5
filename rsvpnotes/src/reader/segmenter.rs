//! Splits plain text into display tokens.

/// Split on runs of whitespace. Punctuation stays attached to its word.
///
/// The result is materialised rather than lazy because playback seeks
/// into it at random.
pub fn segment(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_whitespace_runs() {
        let tokens = segment("  Hello,   world!\n\nSecond\tline.  ");
        assert_eq!(tokens, vec!["Hello,", "world!", "Second", "line."]);
    }

    #[test]
    fn test_whitespace_only_yields_nothing() {
        assert!(segment("").is_empty());
        assert!(segment(" \n\t \r\n").is_empty());
    }

    #[test]
    fn test_segmenting_twice_is_identical() {
        let text = "The quick — brown fox; jumps.";
        assert_eq!(segment(text), segment(text));
        assert_eq!(segment(text).len(), 6);
    }
}
