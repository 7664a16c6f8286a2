/// LLM Client — the single point of entry for all watsonx.ai calls.
///
/// ARCHITECTURAL RULE: No other module may call the AI service directly.
/// All model interactions MUST go through this module.
///
/// One request, one response: no retry, no streaming, no partial output.
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::chat::AiMessage;

const WATSONX_API_VERSION: &str = "2024-05-31";
/// The model used for all LLM calls.
/// Intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "ibm/granite-3-8b-instruct";
const MAX_TOKENS: u32 = 100_000;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct TextChatRequest<'a> {
    model_id: &'a str,
    project_id: &'a str,
    max_tokens: u32,
    messages: &'a [AiMessage],
}

#[derive(Debug, Deserialize)]
struct TextChatResponse {
    choices: Vec<TextChatChoice>,
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct TextChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// The single LLM client used by all handlers.
/// Wraps the watsonx.ai text-chat API.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    service_url: String,
    project_id: String,
}

impl LlmClient {
    pub fn new(api_key: String, service_url: String, project_id: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            service_url: service_url.trim_end_matches('/').to_string(),
            project_id,
        }
    }

    /// Sends an ordered sequence of role-tagged turns to the model and
    /// returns the generated text of the first choice.
    pub async fn text_chat(&self, messages: &[AiMessage]) -> Result<String, LlmError> {
        let request_body = TextChatRequest {
            model_id: MODEL,
            project_id: &self.project_id,
            max_tokens: MAX_TOKENS,
            messages,
        };

        let url = format!(
            "{}/ml/v1/text/chat?version={}",
            self.service_url, WATSONX_API_VERSION
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let chat_response: TextChatResponse = response.json().await?;

        if let Some(usage) = &chat_response.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(LlmError::EmptyContent)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
/// Models wrap JSON in fences despite instructions; anything else is
/// returned unchanged.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n[{\"title\": \"Data Scientist\"}]\n```";
        assert_eq!(strip_json_fences(input), "[{\"title\": \"Data Scientist\"}]");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n[{\"title\": \"Data Scientist\"}]\n```";
        assert_eq!(strip_json_fences(input), "[{\"title\": \"Data Scientist\"}]");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "[{\"title\": \"Data Scientist\"}]";
        assert_eq!(strip_json_fences(input), input);
    }

    #[test]
    fn test_strip_json_fences_unterminated() {
        // Missing closing fence: strip the opener and keep the rest.
        let input = "```json\n{\"key\": 1}";
        assert_eq!(strip_json_fences(input), "{\"key\": 1}");
    }
}
