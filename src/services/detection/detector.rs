// Detector
// Remote classification with a single local fallback

use crate::models::DetectionResult;
use crate::services::providers::{ProviderClient, ProviderError};
use std::time::Duration;
use tracing::{info, warn};

use super::fallback::fallback_detection;
use super::remote::remote_detection;

/// Which path produced a detection result.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DetectionSource {
    Remote,
    Fallback,
}

/// Run remote classification when the client is configured, otherwise (or
/// on any failure or timeout) the heuristic. The remote call is attempted at
/// most once.
pub async fn detect_with_source(
    client: &ProviderClient,
    text: &str,
    allow_remote: bool,
) -> (DetectionResult, DetectionSource) {
    if !allow_remote || !client.is_configured() {
        info!("[DETECTOR] Remote classifier unavailable, using pattern fallback");
        return (fallback_detection(text), DetectionSource::Fallback);
    }

    let timeout_secs = client.settings().timeout_secs;
    let outcome = tokio::time::timeout(
        Duration::from_secs(timeout_secs),
        remote_detection(client, text),
    )
    .await
    .unwrap_or(Err(ProviderError::Timeout(timeout_secs)));

    match outcome {
        Ok(result) => {
            info!(
                "[DETECTOR] Remote score {} ({})",
                result.ai_score,
                result.likelihood.as_str()
            );
            (result, DetectionSource::Remote)
        }
        Err(e) => {
            warn!("[DETECTOR] Remote classification failed, using pattern fallback: {}", e);
            (fallback_detection(text), DetectionSource::Fallback)
        }
    }
}

pub async fn detect(client: &ProviderClient, text: &str) -> DetectionResult {
    detect_with_source(client, text, true).await.0
}
