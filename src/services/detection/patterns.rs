// Pattern Analysis
// Lexical profile of a text sample: sentence rhythm, stock phrases, personal voice

use crate::models::{Level, PatternReport};
use crate::services::text_processor::{mean_and_variance, round_to, sentence_word_counts, word_count};
use regex::Regex;
use std::sync::OnceLock;

/// Phrases common in formulaic LLM output. Reported in this order.
pub const GENERIC_PHRASES: [&str; 10] = [
    "it is important to note",
    "furthermore",
    "in conclusion",
    "however, it is worth noting",
    "delve into",
    "robust",
    "comprehensive",
    "leverage",
    "paramount",
    "multifaceted",
];

/// Variance of sentence word counts below this is LOW.
const VARIANCE_LOW_MAX: f64 = 10.0;
/// Variance below this (and at least `VARIANCE_LOW_MAX`) is MEDIUM.
const VARIANCE_MEDIUM_MAX: f64 = 30.0;
/// Pronoun density (percent of tokens) above which the text has a personal voice.
const PERSONAL_VOICE_MIN: f64 = 2.0;

fn pronoun_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(?:i|my|me|we|us|our)\b").unwrap())
}

pub fn classify_variance(variance: f64) -> Level {
    if variance < VARIANCE_LOW_MAX {
        Level::Low
    } else if variance < VARIANCE_MEDIUM_MAX {
        Level::Medium
    } else {
        Level::High
    }
}

/// Vocabulary entries present at least once, case-insensitively.
pub fn find_generic_phrases(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    GENERIC_PHRASES
        .iter()
        .filter(|p| lower.contains(*p))
        .map(|p| p.to_string())
        .collect()
}

pub fn count_personal_pronouns(text: &str) -> usize {
    pronoun_re().find_iter(text).count()
}

/// Compute the lexical profile of `text`. Total over all inputs; every
/// numeric field is finite.
pub fn analyze_text_patterns(text: &str) -> PatternReport {
    let counts = sentence_word_counts(text);
    let (mean, variance) = mean_and_variance(&counts);

    let generic_phrases_found = find_generic_phrases(text);

    let total_words = word_count(text);
    let pronouns = count_personal_pronouns(text);
    let personal_voice_score = if total_words == 0 {
        0.0
    } else {
        round_to(pronouns as f64 / total_words as f64 * 100.0, 2)
    };

    PatternReport {
        average_sentence_length: round_to(mean, 1),
        sentence_length_variation: classify_variance(variance),
        generic_phrase_count: generic_phrases_found.len(),
        generic_phrases_found,
        personal_pronoun_usage: personal_voice_score > PERSONAL_VOICE_MIN,
        personal_voice_score,
    }
}
