//! OpenAI-compatible chat completion client.
//!
//! Sends one system turn and one user turn with deterministic decoding and
//! returns the first choice's text. Failures to reach the endpoint (network,
//! auth, quota) and replies without the expected structure are reported as
//! distinct errors.

use log::debug;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::AssistantError;
use crate::github::{BODY_SNIPPET_LEN, snippet};
use crate::prompt::SYSTEM_PROMPT;

/// Default OpenAI-compatible router.
pub const DEFAULT_LLM_BASE_URL: &str = "https://router.huggingface.co/v1";

/// Model used when none is configured.
pub const DEFAULT_MODEL_ID: &str = "HuggingFaceTB/SmolLM3-3B:hf-inference";

/// Upper bound on generated tokens per reply.
pub const MAX_OUTPUT_TOKENS: u32 = 500;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Client for the hosted chat completion endpoint.
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    endpoint: Url,
    auth: HeaderValue,
    model: String,
}

impl ChatClient {
    /// Create a client posting to `{base_url}/chat/completions`.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::ClientSetup`] when the URL is invalid, the
    /// key cannot be used as a header value, or the client cannot be built.
    pub fn new(
        api_key: &str,
        base_url: &str,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AssistantError> {
        let setup = |context: &str, message: String| AssistantError::ClientSetup {
            context: context.to_owned(),
            message,
        };
        let endpoint = Url::parse(&format!(
            "{}/chat/completions",
            base_url.trim_end_matches('/')
        ))
        .map_err(|e| setup("parse LLM base URL", format!("{base_url}: {e}")))?;
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| setup("build LLM authorization header", e.to_string()))?;
        auth.set_sensitive(true);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| setup("build LLM client", e.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            auth,
            model: model.into(),
        })
    }

    /// Model identifier sent with each request.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Submit `prompt` as the user turn and return the trimmed reply text.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::LlmRequest`] when the call fails or the
    /// endpoint answers with a non-success status, and
    /// [`AssistantError::LlmFormat`] when the body lacks
    /// `choices[0].message.content`.
    pub async fn complete(&self, prompt: &str) -> Result<String, AssistantError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.0,
            max_tokens: MAX_OUTPUT_TOKENS,
        };
        debug!(
            "requesting completion from {} with model {}",
            self.endpoint, self.model
        );
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(AUTHORIZATION, self.auth.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| AssistantError::LlmRequest(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AssistantError::LlmRequest(e.to_string()))?;
        if !status.is_success() {
            return Err(AssistantError::LlmRequest(format!(
                "HTTP status {} | body snippet: {}",
                status.as_u16(),
                snippet(&body, BODY_SNIPPET_LEN)
            )));
        }
        reply_text(&body)
    }
}

/// Pull `choices[0].message.content` out of a completion body.
fn reply_text(body: &str) -> Result<String, AssistantError> {
    let mut de = serde_json::Deserializer::from_str(body);
    let parsed: ChatResponse = serde_path_to_error::deserialize(&mut de)
        .map_err(|e| AssistantError::LlmFormat(format!("{} at {}", e.inner(), e.path())))?;
    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AssistantError::LlmFormat("response contained no choices".into()))?;
    let content = choice
        .message
        .content
        .ok_or_else(|| AssistantError::LlmFormat("choices[0].message.content is null".into()))?;
    Ok(content.trim().to_owned())
}
