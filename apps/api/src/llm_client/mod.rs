//! LLM Client: the single point of entry for chat-completion calls.
//!
//! Handlers never talk to Azure OpenAI directly: they hold an
//! `Arc<dyn ChatModel>` so tests can swap in a stub.
//!
//! One deployment per process, chosen at startup; no per-request model
//! selection and no sampling parameters.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

pub mod prompts;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Response decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// The chat-completion capability the analyzer depends on.
///
/// Implementations return the text of the first completion choice, or
/// `LlmError::EmptyContent` when the service answered without any.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn send(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;
}

/// Sends the analyst system instruction plus `prompt` and returns the raw
/// completion text.
pub async fn complete(model: &dyn ChatModel, prompt: &str) -> Result<String, LlmError> {
    let messages = [
        ChatMessage::system(prompts::ANALYST_SYSTEM),
        ChatMessage::user(prompt),
    ];
    model.send(&messages).await
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

impl ChatCompletionResponse {
    /// Text of the first choice; further choices are ignored.
    fn into_first_text(self) -> Result<String, LlmError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.is_empty())
            .ok_or(LlmError::EmptyContent)
    }
}

#[derive(Debug, Deserialize)]
struct AzureError {
    error: AzureErrorBody,
}

#[derive(Debug, Deserialize)]
struct AzureErrorBody {
    message: String,
}

/// Azure OpenAI chat-completions client bound to a single deployment.
#[derive(Clone)]
pub struct AzureOpenAiClient {
    client: Client,
    url: String,
    api_key: String,
    deployment: String,
}

impl AzureOpenAiClient {
    pub fn new(config: &Config) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().build()?,
            url: completions_url(
                &config.azure_endpoint,
                &config.azure_deployment,
                &config.azure_api_version,
            ),
            api_key: config.azure_api_key.clone(),
            deployment: config.azure_deployment.clone(),
        })
    }

    pub fn deployment(&self) -> &str {
        &self.deployment
    }
}

fn completions_url(endpoint: &str, deployment: &str, api_version: &str) -> String {
    format!(
        "{}/openai/deployments/{deployment}/chat/completions?api-version={api_version}",
        endpoint.trim_end_matches('/')
    )
}

#[async_trait]
impl ChatModel for AzureOpenAiClient {
    /// Single round trip; transport and API errors are returned as-is, never retried.
    async fn send(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let response = self
            .client
            .post(&self.url)
            .header("api-key", &self.api_key)
            .json(&ChatCompletionRequest { messages })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<AzureError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: ChatCompletionResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &completion.usage {
            debug!(
                "Chat completion succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        completion.into_first_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingModel {
        seen: Mutex<Vec<ChatMessage>>,
    }

    #[async_trait]
    impl ChatModel for RecordingModel {
        async fn send(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
            self.seen.lock().unwrap().extend_from_slice(messages);
            Ok("{}".to_string())
        }
    }

    #[tokio::test]
    async fn test_complete_sends_system_then_user() {
        let model = RecordingModel {
            seen: Mutex::new(Vec::new()),
        };
        complete(&model, "compare these").await.unwrap();

        let seen = model.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], ChatMessage::system(prompts::ANALYST_SYSTEM));
        assert_eq!(seen[1], ChatMessage::user("compare these"));
    }

    #[test]
    fn test_completions_url_trims_trailing_slash() {
        assert_eq!(
            completions_url("https://acme.openai.azure.com/", "gpt-4.1", "2024-10-21"),
            "https://acme.openai.azure.com/openai/deployments/gpt-4.1/chat/completions?api-version=2024-10-21"
        );
    }

    #[test]
    fn test_request_serializes_roles_lowercase() {
        let messages = [ChatMessage::system("sys"), ChatMessage::user("hi")];
        let body = serde_json::to_value(ChatCompletionRequest {
            messages: &messages,
        })
        .unwrap();
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "hi");
    }

    #[test]
    fn test_first_choice_wins() {
        let response: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":"first"}},{"message":{"content":"second"}}]}"#,
        )
        .unwrap();
        assert_eq!(response.into_first_text().unwrap(), "first");
    }

    #[test]
    fn test_no_choices_is_empty_content() {
        let response: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            response.into_first_text(),
            Err(LlmError::EmptyContent)
        ));
    }

    #[test]
    fn test_null_content_is_empty_content() {
        let response: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(matches!(
            response.into_first_text(),
            Err(LlmError::EmptyContent)
        ));
    }
}
