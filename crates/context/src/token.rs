//! Token estimation utilities.
//!
//! Two heuristics, both pure functions of a string:
//! - character based: ~4 characters per token
//! - word based: ~0.75 words per token
//!
//! Neither is exact; they only need to be stable so budgets add up.

use recallkit_config::EstimatorKind;
use serde::{Deserialize, Serialize};

/// Estimate the token count for a string.
///
/// Heuristic: 1 token ≈ 4 characters. Rounds up.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Estimate the token count from the word count.
///
/// Heuristic: 1 token ≈ 0.75 words, i.e. `ceil(words / 0.75)`.
pub fn estimate_tokens_accurate(text: &str) -> usize {
    let words = text.split_whitespace().count();
    (words * 4).div_ceil(3)
}

/// Which estimator to apply when a record carries no token count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenEstimator {
    #[default]
    Chars,
    Words,
}

impl TokenEstimator {
    pub fn estimate(&self, text: &str) -> usize {
        match self {
            Self::Chars => estimate_tokens(text),
            Self::Words => estimate_tokens_accurate(text),
        }
    }
}

impl From<EstimatorKind> for TokenEstimator {
    fn from(kind: EstimatorKind) -> Self {
        match kind {
            EstimatorKind::Chars => Self::Chars,
            EstimatorKind::Words => Self::Words,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_is_zero() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens_accurate(""), 0);
    }

    #[test]
    fn four_chars_is_one_token() {
        assert_eq!(estimate_tokens("test"), 1);
    }

    #[test]
    fn five_chars_rounds_up() {
        assert_eq!(estimate_tokens("hello"), 2);
    }

    #[test]
    fn hundred_chars() {
        let text = "a".repeat(100);
        assert_eq!(estimate_tokens(&text), 25);
    }

    #[test]
    fn multibyte_text_counts_characters() {
        // 4 characters, 12 bytes
        assert_eq!(estimate_tokens("日本語だ"), 1);
    }

    #[test]
    fn word_estimate_rounds_up() {
        // 3 words / 0.75 = 4
        assert_eq!(estimate_tokens_accurate("one two three"), 4);
        // 1 word / 0.75 = 1.33 → 2
        assert_eq!(estimate_tokens_accurate("single"), 2);
    }

    #[test]
    fn word_estimate_ignores_surrounding_and_repeated_whitespace() {
        assert_eq!(estimate_tokens_accurate("  one \n\t two   three  "), 4);
        assert_eq!(estimate_tokens_accurate("   "), 0);
    }

    #[test]
    fn estimator_dispatch() {
        let text = "The quick brown fox";
        assert_eq!(TokenEstimator::Chars.estimate(text), 5);
        assert_eq!(TokenEstimator::Words.estimate(text), 6);
        assert_eq!(TokenEstimator::from(EstimatorKind::Words), TokenEstimator::Words);
    }
}
