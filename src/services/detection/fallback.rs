// Fallback Detection
// Deterministic heuristic scoring used when the remote classifier is unavailable

use crate::models::{DetectionDetails, DetectionResult, Level, PatternReport};

use super::patterns::analyze_text_patterns;

pub const FALLBACK_REASONING: &str = "Using fallback pattern detection (OpenAI API unavailable)";

const UNIFORM_SENTENCES_POINTS: u32 = 30;
const GENERIC_PHRASES_POINTS: u32 = 25;
const NO_PERSONAL_VOICE_POINTS: u32 = 20;
const LONG_SENTENCES_POINTS: u32 = 15;
const CLEAN_FORMATTING_POINTS: u32 = 10;

const GENERIC_PHRASES_MIN: usize = 3;
const LONG_SENTENCE_MIN: f64 = 20.0;
const MAX_SCORE: u32 = 100;

/// Likelihood bands for the heuristic score. Strict comparisons: 70 is MEDIUM.
pub fn fallback_likelihood(score: u32) -> Level {
    if score > 70 {
        Level::High
    } else if score > 40 {
        Level::Medium
    } else {
        Level::Low
    }
}

/// True when the text has no double space and no `..`.
fn has_clean_formatting(text: &str) -> bool {
    !text.contains("  ") && !text.contains("..")
}

/// Additive score and indicators for an already computed report.
fn score_patterns(text: &str, report: &PatternReport) -> (u32, Vec<String>) {
    let mut score = 0u32;
    let mut indicators = Vec::new();

    if report.sentence_length_variation == Level::Low {
        score += UNIFORM_SENTENCES_POINTS;
        indicators.push("Highly uniform sentence lengths".to_string());
    }

    if report.generic_phrase_count >= GENERIC_PHRASES_MIN {
        score += GENERIC_PHRASES_POINTS;
        indicators.push(format!("Found {} AI-common phrases", report.generic_phrase_count));
    }

    if !report.personal_pronoun_usage {
        score += NO_PERSONAL_VOICE_POINTS;
        indicators.push("Lacks personal voice and pronouns".to_string());
    }

    if report.average_sentence_length > LONG_SENTENCE_MIN {
        score += LONG_SENTENCES_POINTS;
        indicators.push("Consistently long, complex sentences".to_string());
    }

    if has_clean_formatting(text) {
        score += CLEAN_FORMATTING_POINTS;
        indicators.push("Perfect formatting with no typos".to_string());
    }

    (score.min(MAX_SCORE), indicators)
}

/// Heuristic AI-content estimate. Pure; never fails.
pub fn fallback_detection(text: &str) -> DetectionResult {
    let patterns = analyze_text_patterns(text);
    let (ai_score, indicators) = score_patterns(text, &patterns);

    DetectionResult {
        ai_score,
        likelihood: fallback_likelihood(ai_score),
        confidence: Level::Low,
        indicators,
        details: DetectionDetails {
            patterns,
            reasoning: FALLBACK_REASONING.to_string(),
            human_likelihood: None,
        },
    }
}
