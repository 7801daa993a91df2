// AI Provider Service
// OpenAI-compatible chat completions client

use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::{Duration, Instant};
use thiserror::Error;

use super::config_store::AppConfig;

pub const OPENAI_DEFAULT_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("Missing content in response")]
    MissingContent,
    #[error("JSON parse error: {0}")]
    JsonError(String),
    #[error("API key not configured")]
    MissingApiKey,
    #[error("Request timed out after {0}s")]
    Timeout(u64),
}

/// Connection settings for the remote model. Built once at startup and
/// handed to `ProviderClient`; an absent key means remote calls are disabled.
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: OPENAI_DEFAULT_MODEL.to_string(),
            base_url: OPENAI_DEFAULT_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl OpenAiSettings {
    /// Resolve settings from the environment first, then the config file.
    pub fn resolve(config: &AppConfig) -> Self {
        let api_key = get_api_key("openai", config);
        let model = env_value(&["ACADEMICFLOW_OPENAI_MODEL"])
            .or_else(|| config.openai.model.clone())
            .unwrap_or_else(|| OPENAI_DEFAULT_MODEL.to_string());
        let base_url = env_value(&["OPENAI_API_URL", "ACADEMICFLOW_OPENAI_API_URL"])
            .or_else(|| config.openai.base_url.clone())
            .unwrap_or_else(|| OPENAI_DEFAULT_URL.to_string());

        Self {
            api_key,
            model,
            base_url,
            timeout_secs: config.detection.remote_timeout_secs,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().map_or(false, |k| !k.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Clone, Serialize)]
struct ResponseFormat {
    r#type: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Option<Vec<ChatChoice>>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessageResponse>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResult {
    pub content: String,
    pub latency_ms: i64,
}

pub struct ProviderClient {
    client: Client,
    settings: OpenAiSettings,
}

impl ProviderClient {
    pub fn new(settings: OpenAiSettings) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1) + 20))
            .build()
            .unwrap_or_default();

        Self { client, settings }
    }

    pub fn with_proxy(settings: OpenAiSettings, proxy_url: &str) -> Result<Self, ProviderError> {
        let proxy = reqwest::Proxy::all(proxy_url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1) + 20))
            .proxy(proxy)
            .build()?;

        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &OpenAiSettings {
        &self.settings
    }

    pub fn is_configured(&self) -> bool {
        self.settings.is_configured()
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Plain-text completion.
    pub async fn call_chat(&self, system: &str, user: &str) -> Result<ChatResult, ProviderError> {
        self.call_chat_api(system, user, false).await
    }

    /// Completion constrained to a JSON object (the prompt must mention JSON).
    pub async fn call_chat_json(&self, system: &str, user: &str) -> Result<ChatResult, ProviderError> {
        self.call_chat_api(system, user, true).await
    }

    async fn call_chat_api(
        &self,
        system: &str,
        user: &str,
        use_json_format: bool,
    ) -> Result<ChatResult, ProviderError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ProviderError::MissingApiKey)?;

        let request = ChatRequest {
            model: self.settings.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            response_format: if use_json_format {
                Some(ResponseFormat {
                    r#type: "json_object".to_string(),
                })
            } else {
                None
            },
        };

        let start = Instant::now();

        let response = self
            .client
            .post(&self.settings.base_url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let latency_ms = start.elapsed().as_millis() as i64;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let data: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::JsonError(e.to_string()))?;

        let content = data
            .choices
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.clone())
            .ok_or(ProviderError::MissingContent)?;

        Ok(ChatResult { content, latency_ms })
    }
}

/// Cut the outermost `{...}` out of a model reply that may wrap JSON in prose
/// or code fences.
pub fn extract_json(content: &str) -> Option<&str> {
    let content = content.trim();
    if content.starts_with('{') && content.ends_with('}') {
        return Some(content);
    }
    let re = Regex::new(r"(?s)\{.*\}").ok()?;
    re.find(content).map(|m| m.as_str())
}

fn env_value(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| env::var(k).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

/// Get API key from environment or config file
pub fn get_api_key(provider: &str, config: &AppConfig) -> Option<String> {
    let env_keys: &[&str] = match provider {
        "openai" => &["OPENAI_API_KEY", "ACADEMICFLOW_OPENAI_API_KEY"],
        _ => &[],
    };

    env_value(env_keys).or_else(|| {
        config
            .api_keys
            .get(provider)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_configured() {
        let mut settings = OpenAiSettings::default();
        assert!(!settings.is_configured());
        settings.api_key = Some("   ".to_string());
        assert!(!settings.is_configured());
        settings.api_key = Some("sk-test".to_string());
        assert!(settings.is_configured());
    }

    #[test]
    fn test_extract_json() {
        assert_eq!(extract_json(r#" {"score": 1} "#), Some(r#"{"score": 1}"#));
        assert_eq!(
            extract_json("```json\n{\"score\": 80}\n```"),
            Some("{\"score\": 80}")
        );
        assert_eq!(extract_json("no json here"), None);
    }

    #[tokio::test]
    async fn test_unconfigured_client_refuses_call() {
        let client = ProviderClient::new(OpenAiSettings::default());
        let err = client.call_chat("system", "user").await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingApiKey));
    }
}
