//! Training mode speed ramp.

use crate::config::{TRAINING_MAX_WPM, TRAINING_STEP_TOKENS};

/// Speed after `token_index` tokens of a training session that began at
/// `start_wpm`: one `increment` every 50 tokens, never above 800.
pub fn effective_wpm(token_index: usize, start_wpm: u32, increment: u32) -> u32 {
    let steps = u32::try_from(token_index / TRAINING_STEP_TOKENS).unwrap_or(u32::MAX);
    start_wpm
        .saturating_add(steps.saturating_mul(increment))
        .min(TRAINING_MAX_WPM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_steps_every_fifty_tokens() {
        assert_eq!(effective_wpm(0, 300, 10), 300);
        assert_eq!(effective_wpm(49, 300, 10), 300);
        assert_eq!(effective_wpm(50, 300, 10), 310);
        assert_eq!(effective_wpm(149, 300, 10), 320);
        assert_eq!(effective_wpm(150, 300, 10), 330);
    }

    #[test]
    fn test_ramp_never_exceeds_cap() {
        for start in [100, 450, 790, 800] {
            for index in [0, 50, 1_000, 100_000, usize::MAX] {
                assert!(effective_wpm(index, start, 10) <= TRAINING_MAX_WPM);
            }
        }
        assert_eq!(effective_wpm(usize::MAX, 300, u32::MAX), TRAINING_MAX_WPM);
    }
}
