// API Layer
// Authenticated, role-checked entry points over the services.
// Session resolution and HTTP wiring live outside this crate; handlers
// receive an already resolved `Caller`.

use crate::models::{
    AssistAction, AssistRequest, AssistResponse, Caller, CitationVerification, DetectRequest,
    DetectionResult, GenerateCitationRequest, GeneratedCitation, Role, VerifyCitationsRequest,
};
use crate::services::config_store::AppConfig;
use crate::services::providers::{OpenAiSettings, ProviderClient, ProviderError};
use crate::services::text_processor::trimmed_char_len;
use crate::services::{assistant, detection};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Upstream(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Unauthorized => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::BadRequest(_) => 400,
            ApiError::Upstream(_) => 500,
        }
    }
}

/// Shared handler state: one HTTP client and the detection settings.
#[derive(Clone)]
pub struct AppState {
    client: Arc<ProviderClient>,
    min_content_chars: usize,
    use_remote: bool,
}

impl AppState {
    pub fn new(client: ProviderClient, config: &AppConfig) -> Self {
        Self {
            client: Arc::new(client),
            min_content_chars: config.detection.min_content_chars,
            use_remote: config.detection.use_remote,
        }
    }

    /// Build state from a loaded config, honoring its proxy setting.
    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        let settings = OpenAiSettings::resolve(config);
        let client = match config.proxy.as_ref().and_then(|p| p.active_url()) {
            Some(url) => ProviderClient::with_proxy(settings, url)?,
            None => ProviderClient::new(settings),
        };
        Ok(Self::new(client, config))
    }

    pub fn client(&self) -> &ProviderClient {
        &self.client
    }

    pub fn remote_enabled(&self) -> bool {
        self.use_remote && self.client.is_configured()
    }
}

fn require_user(caller: &Caller) -> Result<&str, ApiError> {
    caller.user_id.as_deref().ok_or(ApiError::Unauthorized)
}

fn require_faculty(caller: &Caller) -> Result<&str, ApiError> {
    let user_id = require_user(caller)?;
    if caller.role != Some(Role::Faculty) {
        return Err(ApiError::Forbidden("Faculty access required".to_string()));
    }
    Ok(user_id)
}

fn require_text<'a>(text: &'a str, field: &str) -> Result<&'a str, ApiError> {
    if text.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{} is required", field)));
    }
    Ok(text)
}

fn upstream(context: &str, request_id: &Uuid, e: ProviderError) -> ApiError {
    warn!(request_id = %request_id, "[API] {}: {}", context, e);
    ApiError::Upstream(context.to_string())
}

/// Faculty-only AI-content detection. Once input passes validation this
/// always returns a result: remote failures fall back to the heuristic.
pub async fn detect_ai(
    state: &AppState,
    caller: &Caller,
    req: DetectRequest,
) -> Result<DetectionResult, ApiError> {
    let user_id = require_faculty(caller)?;

    let length = trimmed_char_len(&req.content);
    if length < state.min_content_chars {
        return Err(ApiError::BadRequest(format!(
            "Content must be at least {} characters",
            state.min_content_chars
        )));
    }

    let request_id = Uuid::new_v4();
    info!(request_id = %request_id, user_id, chars = length, "[API] detect_ai");
    let (result, source) =
        detection::detect_with_source(state.client(), &req.content, state.use_remote).await;
    info!(
        request_id = %request_id,
        score = result.ai_score,
        source = ?source,
        "[API] detect_ai done"
    );
    Ok(result)
}

/// Faculty-only citation authenticity check.
pub async fn verify_citations(
    state: &AppState,
    caller: &Caller,
    req: VerifyCitationsRequest,
) -> Result<CitationVerification, ApiError> {
    let user_id = require_faculty(caller)?;
    let content = require_text(&req.content, "content")?;

    let request_id = Uuid::new_v4();
    info!(request_id = %request_id, user_id, style = %req.style, "[API] verify_citations");
    assistant::verify_citations(state.client(), content, &req.style)
        .await
        .map_err(|e| upstream("Failed to verify citations", &request_id, e))
}

pub async fn generate_citation(
    state: &AppState,
    caller: &Caller,
    req: GenerateCitationRequest,
) -> Result<GeneratedCitation, ApiError> {
    let user_id = require_user(caller)?;
    let input = require_text(&req.input_text, "inputText")?;

    let request_id = Uuid::new_v4();
    info!(
        request_id = %request_id,
        user_id,
        style = %req.citation_style,
        "[API] generate_citation"
    );
    let formatted = assistant::generate_citation(state.client(), input, &req.citation_style)
        .await
        .map_err(|e| upstream("Failed to generate citation", &request_id, e))?;

    Ok(GeneratedCitation {
        input_text: req.input_text,
        formatted_citation: formatted,
        citation_style: req.citation_style,
    })
}

pub async fn assist_text(
    state: &AppState,
    caller: &Caller,
    action: AssistAction,
    req: AssistRequest,
) -> Result<AssistResponse, ApiError> {
    let user_id = require_user(caller)?;
    let text = require_text(&req.text, "text")?;

    let request_id = Uuid::new_v4();
    info!(request_id = %request_id, user_id, action = ?action, "[API] assist_text");
    let context = match action {
        AssistAction::Improve => "Failed to improve text",
        AssistAction::Summarize => "Failed to summarize text",
        AssistAction::Grammar => "Failed to check grammar",
    };
    let result = assistant::assist(state.client(), action, text)
        .await
        .map_err(|e| upstream(context, &request_id, e))?;
    Ok(AssistResponse { result })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Level;
    use crate::services::detection::FALLBACK_REASONING;

    const CONTENT: &str =
        "The results indicate a robust and comprehensive improvement across every category.";

    fn offline_state() -> AppState {
        AppState::new(ProviderClient::new(OpenAiSettings::default()), &AppConfig::default())
    }

    fn faculty() -> Caller {
        Caller::new("fac-1", Role::Faculty)
    }

    fn detect_req(content: impl Into<String>) -> DetectRequest {
        DetectRequest { content: content.into() }
    }

    #[tokio::test]
    async fn test_detect_requires_user() {
        let state = offline_state();
        let err = detect_ai(&state, &Caller::anonymous(), detect_req(CONTENT))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[tokio::test]
    async fn test_detect_requires_faculty() {
        let caller = Caller::new("stu-1", Role::Student);
        let err = detect_ai(&offline_state(), &caller, detect_req(CONTENT))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.to_string(), "Faculty access required");
    }

    #[tokio::test]
    async fn test_detect_rejects_short_content() {
        let state = offline_state();
        let padded = format!("   {}   ", "x".repeat(49));
        let err = detect_ai(&state, &faculty(), detect_req(padded))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);

        let ok = detect_ai(&state, &faculty(), detect_req("x".repeat(50))).await;
        assert!(ok.is_ok());
    }

    #[tokio::test]
    async fn test_detect_offline_returns_fallback() {
        let result = detect_ai(&offline_state(), &faculty(), detect_req(CONTENT))
            .await
            .unwrap();
        assert_eq!(result.confidence, Level::Low);
        assert_eq!(result.details.reasoning, FALLBACK_REASONING);
    }

    #[tokio::test]
    async fn test_verify_citations_checks_role_then_upstream() {
        let state = offline_state();
        let req = VerifyCitationsRequest {
            content: "Doe (2020)".to_string(),
            style: "APA".to_string(),
        };
        let err = verify_citations(&state, &Caller::new("s", Role::Student), req.clone())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);

        let err = verify_citations(&state, &faculty(), req).await.unwrap_err();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.to_string(), "Failed to verify citations");
    }

    #[tokio::test]
    async fn test_assist_validates_text() {
        let state = offline_state();
        let caller = Caller::new("stu-2", Role::Student);
        let blank = AssistRequest { text: "  ".to_string() };
        let err = assist_text(&state, &caller, AssistAction::Improve, blank)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);

        let req = GenerateCitationRequest {
            input_text: "doi:10.1000/182".to_string(),
            citation_style: "MLA".to_string(),
        };
        let err = generate_citation(&state, &caller, req).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to generate citation");
    }

    #[test]
    fn test_remote_enabled_needs_key() {
        assert!(!offline_state().remote_enabled());
    }
}
