// AcademicFlow Data Models
// Request and response shapes shared by the services and the API layer

use serde::{Deserialize, Serialize};

// ============ Shared Levels ============

/// Three-step categorical level used for likelihood, confidence and
/// sentence-length variation. Serialized as `"HIGH" | "MEDIUM" | "LOW"`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Low => "LOW",
            Level::Medium => "MEDIUM",
            Level::High => "HIGH",
        }
    }

    /// Lenient parse for model output; unknown values map to `None`.
    pub fn parse(val: &str) -> Option<Self> {
        match val.trim().to_uppercase().as_str() {
            "LOW" => Some(Level::Low),
            "MEDIUM" => Some(Level::Medium),
            "HIGH" => Some(Level::High),
            _ => None,
        }
    }
}

// ============ Users ============

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Faculty,
}

/// Identity resolved by the session layer before a request reaches the API.
#[derive(Debug, Clone, Default)]
pub struct Caller {
    pub user_id: Option<String>,
    pub role: Option<Role>,
}

impl Caller {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: Some(user_id.into()),
            role: Some(role),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

// ============ AI Detection ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectRequest {
    pub content: String,
}

/// Lexical profile of a text sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternReport {
    pub average_sentence_length: f64,
    pub sentence_length_variation: Level,
    pub generic_phrase_count: usize,
    pub generic_phrases_found: Vec<String>,
    pub personal_pronoun_usage: bool,
    pub personal_voice_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionDetails {
    #[serde(flatten)]
    pub patterns: PatternReport,
    pub reasoning: String,
    /// Only set by the remote classifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub human_likelihood: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub ai_score: u32,
    pub likelihood: Level,
    pub confidence: Level,
    pub indicators: Vec<String>,
    pub details: DetectionDetails,
}

// ============ Citations ============

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationStatus {
    Verified,
    Suspicious,
    Fake,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationCheck {
    #[serde(default)]
    pub citation: String,
    pub status: CitationStatus,
    #[serde(default)]
    pub details: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CitationVerification {
    #[serde(default)]
    pub results: Vec<CitationCheck>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCitationsRequest {
    pub content: String,
    #[serde(default = "default_style")]
    pub style: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCitationRequest {
    pub input_text: String,
    #[serde(default = "default_style")]
    pub citation_style: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCitation {
    pub input_text: String,
    pub formatted_citation: String,
    pub citation_style: String,
}

// ============ Writing Assistant ============

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssistAction {
    Improve,
    Summarize,
    Grammar,
}

impl AssistAction {
    pub fn parse(val: &str) -> Option<Self> {
        match val.trim().to_lowercase().as_str() {
            "improve" => Some(Self::Improve),
            "summarize" => Some(Self::Summarize),
            "grammar" => Some(Self::Grammar),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistRequest {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistResponse {
    pub result: String,
}

// ============ Default Value Functions ============

fn default_style() -> String { "APA".to_string() }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_serialization() {
        assert_eq!(serde_json::to_string(&Level::High).unwrap(), "\"HIGH\"");
        assert_eq!(Level::parse(" medium "), Some(Level::Medium));
        assert_eq!(Level::parse("certain"), None);
    }

    #[test]
    fn test_assist_action_parse() {
        assert_eq!(AssistAction::parse(" Summarize "), Some(AssistAction::Summarize));
        assert_eq!(AssistAction::parse("GRAMMAR"), Some(AssistAction::Grammar));
        assert_eq!(AssistAction::parse("translate"), None);
    }

    #[test]
    fn test_details_flatten_omits_human_likelihood() {
        let details = DetectionDetails {
            patterns: PatternReport {
                average_sentence_length: 12.5,
                sentence_length_variation: Level::Medium,
                generic_phrase_count: 1,
                generic_phrases_found: vec!["robust".to_string()],
                personal_pronoun_usage: false,
                personal_voice_score: 0.0,
            },
            reasoning: "r".to_string(),
            human_likelihood: None,
        };
        let value = serde_json::to_value(&details).unwrap();
        assert_eq!(value["averageSentenceLength"], 12.5);
        assert_eq!(value["sentenceLengthVariation"], "MEDIUM");
        assert_eq!(value["genericPhrasesFound"][0], "robust");
        assert!(value.get("humanLikelihood").is_none());
    }

    #[test]
    fn test_request_default_style() {
        let req: VerifyCitationsRequest = serde_json::from_str(r#"{"content":"x"}"#).unwrap();
        assert_eq!(req.style, "APA");
        let req: GenerateCitationRequest =
            serde_json::from_str(r#"{"inputText":"doi:10.1/x","citationStyle":"MLA"}"#).unwrap();
        assert_eq!(req.citation_style, "MLA");
    }

    #[test]
    fn test_verification_parses_status() {
        let v: CitationVerification = serde_json::from_str(
            r#"{"results":[{"citation":"Smith (2020)","status":"suspicious","details":"no DOI"}]}"#,
        )
        .unwrap();
        assert_eq!(v.results[0].status, CitationStatus::Suspicious);
    }
}
