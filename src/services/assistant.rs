// Writing Assistant
// Citation formatting, citation verification and text rewriting via the chat model

use crate::models::{AssistAction, CitationVerification};
use serde::Deserialize;
use tracing::{info, warn};

use super::providers::{extract_json, ProviderClient, ProviderError};

const IMPROVE_PROMPT: &str = "You are a writing assistant. Improve the following text for clarity, coherence, and professional academic tone. Return only the improved text.";
const SUMMARIZE_PROMPT: &str = "You are a summarization assistant. Create a concise summary of the following text while preserving key points. Return only the summary.";
const GRAMMAR_PROMPT: &str = "You are a grammar checker. Fix all grammar, spelling, and punctuation errors in the following text. Return only the corrected text.";

fn citation_prompt(style: &str) -> String {
    format!(
        "You are a citation generator. Generate a properly formatted {} citation based on the user's input. \
         The input might be a DOI, URL, book title, or description. Return ONLY the formatted citation, nothing else.",
        style
    )
}

fn verification_prompt(style: &str) -> String {
    format!(
        "You are a citation verifier. Extract all {} citations from the text and verify their authenticity. \
         Respond in JSON format: {{\"results\": [{{\"citation\": string, \"status\": \"verified\"|\"suspicious\"|\"fake\", \"details\": string}}]}}",
        style
    )
}

fn action_prompt(action: AssistAction) -> &'static str {
    match action {
        AssistAction::Improve => IMPROVE_PROMPT,
        AssistAction::Summarize => SUMMARIZE_PROMPT,
        AssistAction::Grammar => GRAMMAR_PROMPT,
    }
}

/// Format a citation for a DOI, URL, title or free-form description.
pub async fn generate_citation(
    client: &ProviderClient,
    input: &str,
    style: &str,
) -> Result<String, ProviderError> {
    let user = format!("Generate a {} citation for: {}", style, input);
    let reply = client.call_chat(&citation_prompt(style), &user).await?;
    info!("[ASSISTANT] Citation generated in {}ms", reply.latency_ms);
    Ok(reply.content.trim().to_string())
}

#[derive(Debug, Deserialize)]
struct RawVerification {
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

/// Parse a verification reply. Entries with an unknown status are skipped;
/// an unusable reply yields an empty result list.
pub fn parse_verification(content: &str) -> CitationVerification {
    let Some(json) = extract_json(content) else {
        return CitationVerification::default();
    };
    let raw = match serde_json::from_str::<RawVerification>(json) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("[ASSISTANT] Verification parse error: {}", e);
            return CitationVerification::default();
        }
    };

    let results = raw
        .results
        .into_iter()
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect();
    CitationVerification { results }
}

/// Extract citations in `style` from `content` and rate their authenticity.
pub async fn verify_citations(
    client: &ProviderClient,
    content: &str,
    style: &str,
) -> Result<CitationVerification, ProviderError> {
    let reply = client.call_chat_json(&verification_prompt(style), content).await?;
    let verification = parse_verification(&reply.content);
    info!(
        "[ASSISTANT] Verified {} citations in {}ms",
        verification.results.len(),
        reply.latency_ms
    );
    Ok(verification)
}

/// Rewrite `text` according to `action`.
pub async fn assist(
    client: &ProviderClient,
    action: AssistAction,
    text: &str,
) -> Result<String, ProviderError> {
    let reply = client.call_chat(action_prompt(action), text).await?;
    Ok(reply.content)
}
