// Text Processing Service
// Sentence segmentation and token helpers shared by the detectors

use regex::Regex;
use std::sync::OnceLock;

fn terminator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]+").unwrap())
}

/// Split text on runs of `.`, `!` or `?`, dropping fragments that are blank
/// after trimming. Text without any terminator comes back as one sentence.
pub fn split_sentences(text: &str) -> Vec<&str> {
    terminator_re()
        .split(text)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Whitespace-delimited token count.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Per-sentence word counts, in sentence order.
pub fn sentence_word_counts(text: &str) -> Vec<usize> {
    split_sentences(text).into_iter().map(word_count).collect()
}

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Mean and population variance. Both are 0 for an empty slice.
pub fn mean_and_variance(values: &[usize]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<usize>() as f64 / n;
    let variance = values
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    (mean, variance)
}

/// Character count (Unicode scalars) of the trimmed text.
pub fn trimmed_char_len(text: &str) -> usize {
    text.trim().chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sentences_basic() {
        let s = split_sentences("One two. Three!! Four five six?  ");
        assert_eq!(s, vec!["One two", "Three", "Four five six"]);
    }

    #[test]
    fn test_split_sentences_without_terminator() {
        assert_eq!(split_sentences("no terminator here"), vec!["no terminator here"]);
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("...!?").is_empty());
        assert!(split_sentences("   ").is_empty());
    }

    #[test]
    fn test_mean_and_variance_population() {
        let (mean, var) = mean_and_variance(&[2, 4, 4, 4, 5, 5, 7, 9]);
        assert_eq!(mean, 5.0);
        assert_eq!(var, 4.0);
        assert_eq!(mean_and_variance(&[]), (0.0, 0.0));
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(12.345, 1), 12.3);
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(1.0 / 3.0 * 100.0, 2), 33.33);
    }

    #[test]
    fn test_trimmed_char_len_counts_scalars() {
        assert_eq!(trimmed_char_len("  héllo  "), 5);
    }
}
