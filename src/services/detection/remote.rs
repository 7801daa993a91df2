// Remote Classifier
// Asks the configured chat model for a JSON verdict and maps it onto DetectionResult

use crate::models::{DetectionDetails, DetectionResult, Level};
use crate::services::providers::{extract_json, ProviderClient, ProviderError};
use serde::Deserialize;
use tracing::{debug, warn};

use super::patterns::analyze_text_patterns;

const DETECTION_SYSTEM_PROMPT: &str = r#"You are an AI content detector for academic writing. Analyze the following text and estimate the likelihood (0-100) that it was AI-generated.
Respond in JSON format with these fields:
- score: number from 0 to 100
- indicators: array of short strings naming concrete signals you observed
- confidence: "HIGH", "MEDIUM" or "LOW"
- reasoning: one or two sentences explaining the score
- humanLikelihood: number from 0 to 100, the likelihood the text was written by a person
Return only the JSON object."#;

pub const UNPARSED_REASONING: &str = "Unable to parse detection response";

/// Verdict as returned by the model. Every field has a default so partial
/// replies still deserialize.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteVerdict {
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub indicators: Vec<String>,
    #[serde(default)]
    pub confidence: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub human_likelihood: Option<f64>,
}

impl Default for RemoteVerdict {
    fn default() -> Self {
        Self {
            score: 0.0,
            indicators: Vec::new(),
            confidence: None,
            reasoning: Some(UNPARSED_REASONING.to_string()),
            human_likelihood: None,
        }
    }
}

/// Likelihood bands for the remote score. Inclusive comparisons: 70 is HIGH.
pub fn remote_likelihood(score: u32) -> Level {
    if score >= 70 {
        Level::High
    } else if score >= 40 {
        Level::Medium
    } else {
        Level::Low
    }
}

/// Parse a model reply; anything unusable yields `RemoteVerdict::default()`.
pub fn parse_verdict(content: &str) -> RemoteVerdict {
    let Some(json) = extract_json(content) else {
        warn!("[REMOTE] No JSON object in model reply");
        return RemoteVerdict::default();
    };
    match serde_json::from_str::<RemoteVerdict>(json) {
        Ok(verdict) => verdict,
        Err(e) => {
            warn!("[REMOTE] Verdict parse error: {}", e);
            RemoteVerdict::default()
        }
    }
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Merge a verdict with the locally computed pattern report.
pub fn verdict_to_result(text: &str, verdict: RemoteVerdict) -> DetectionResult {
    let ai_score = clamp_percent(verdict.score).round() as u32;
    let confidence = verdict
        .confidence
        .as_deref()
        .and_then(Level::parse)
        .unwrap_or(Level::Medium);

    DetectionResult {
        ai_score,
        likelihood: remote_likelihood(ai_score),
        confidence,
        indicators: verdict.indicators,
        details: DetectionDetails {
            patterns: analyze_text_patterns(text),
            reasoning: verdict
                .reasoning
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| UNPARSED_REASONING.to_string()),
            human_likelihood: verdict.human_likelihood.map(clamp_percent),
        },
    }
}

/// Classify `text` with the remote model. Errors only on transport or API
/// failure; a malformed reply degrades to the default verdict.
pub async fn remote_detection(
    client: &ProviderClient,
    text: &str,
) -> Result<DetectionResult, ProviderError> {
    let reply = client.call_chat_json(DETECTION_SYSTEM_PROMPT, text).await?;
    debug!(
        "[REMOTE] Model {} replied in {}ms ({} chars)",
        client.model(),
        reply.latency_ms,
        reply.content.len()
    );
    Ok(verdict_to_result(text, parse_verdict(&reply.content)))
}
