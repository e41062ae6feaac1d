use serde::Serialize;

/// Length ratios above this percentage are flagged.
pub const RATIO_OUTLIER_THRESHOLD: u32 = 200;

/// Word counts and length ratio shown under a single or chain result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LengthMetrics {
    pub original_words: usize,
    pub refined_words: usize,
    /// `refined / original * 100`, rounded; 0 when the original is empty.
    pub ratio: u32,
}

impl LengthMetrics {
    pub fn compute(original: &str, refined: &str) -> Self {
        let original_words = word_count(original);
        let refined_words = word_count(refined);
        let ratio = if original_words > 0 {
            (refined_words as f64 / original_words as f64 * 100.0).round() as u32
        } else {
            0
        };
        Self {
            original_words,
            refined_words,
            ratio,
        }
    }

    pub fn is_outlier(&self) -> bool {
        self.ratio > RATIO_OUTLIER_THRESHOLD
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
