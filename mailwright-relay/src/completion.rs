//! Text generation through Groq's OpenAI-compatible API
//!
//! [`CompletionProvider`] is the seam handlers depend on; [`GroqProvider`]
//! is the production implementation. The caller's API key is forwarded as a
//! bearer token on every request and is never stored or logged.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::GroqSettings;

/// Instruction sent ahead of every user prompt
pub const SYSTEM_PROMPT: &str = "You are an expert email writer. Generate professional, well-structured emails \
based on the user's prompt. Return only the email content without any additional \
formatting or explanations. Include a clear subject line at the beginning marked \
with 'Subject:' followed by the email body. Make sure the email is professional, \
engaging, and appropriate for business communication.";

/// Subject used when the completion has no `Subject:` line
pub const FALLBACK_SUBJECT: &str = "Generated Email";

const SUBJECT_PREFIX: &str = "subject:";

/// Completion failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompletionError {
    /// Upstream answered with a non-200 status
    #[error("completion API returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Upstream could not be reached
    #[error("network error: {0}")]
    Network(String),

    /// Upstream answered 200 with an unexpected payload
    #[error("malformed completion: {0}")]
    Malformed(String),
}

/// Something that turns a prompt into email text
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generate raw email text for `prompt`
    ///
    /// # Errors
    ///
    /// Returns `CompletionError` if the upstream call fails
    async fn complete(&self, api_key: &str, prompt: &str) -> Result<String, CompletionError>;

    /// List the models available to `api_key`
    ///
    /// # Errors
    ///
    /// Returns `CompletionError` if the upstream call fails
    async fn list_models(&self, api_key: &str) -> Result<serde_json::Value, CompletionError>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: [ChatMessage<'a>; 2],
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: String,
}

/// Groq chat-completions client
#[derive(Debug, Clone)]
pub struct GroqProvider {
    http: Client,
    settings: GroqSettings,
}

impl GroqProvider {
    /// Create a provider with a client honouring the configured timeout
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client cannot be built
    pub fn new(settings: GroqSettings) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(settings.http_timeout()).build()?;
        Ok(Self { http, settings })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.settings.base_url.trim_end_matches('/'))
    }

    async fn check_http_response(response: reqwest::Response) -> Result<reqwest::Response, CompletionError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::error!(status = status.as_u16(), body = %body, "Groq API error");
        Err(CompletionError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl CompletionProvider for GroqProvider {
    async fn complete(&self, api_key: &str, prompt: &str) -> Result<String, CompletionError> {
        let user_prompt = format!("Generate an email based on this prompt: {prompt}");
        let request = ChatRequest {
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            model: &self.settings.model,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        let response = self
            .http
            .post(self.url("/chat/completions"))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        let completion: ChatResponse = Self::check_http_response(response)
            .await?
            .json()
            .await
            .map_err(|e| CompletionError::Malformed(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| CompletionError::Malformed("no choices in completion".to_string()))
    }

    async fn list_models(&self, api_key: &str) -> Result<serde_json::Value, CompletionError> {
        let response = self
            .http
            .get(self.url("/models"))
            .bearer_auth(api_key)
            .send()
            .await
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        Self::check_http_response(response)
            .await?
            .json()
            .await
            .map_err(|e| CompletionError::Malformed(e.to_string()))
    }
}

/// Split raw completion text into `(subject, body)`
///
/// A first line starting with `Subject:` (any case) becomes the subject and
/// the remaining lines, trimmed, the body. Otherwise the subject is
/// [`FALLBACK_SUBJECT`] and the whole trimmed text is the body.
#[must_use]
pub fn split_subject(completion: &str) -> (String, String) {
    let (first, rest) = completion.split_once('\n').unwrap_or((completion, ""));
    let is_subject = first
        .get(..SUBJECT_PREFIX.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(SUBJECT_PREFIX));

    if is_subject {
        let subject = first[SUBJECT_PREFIX.len()..].trim().to_string();
        (subject, rest.trim().to_string())
    } else {
        (FALLBACK_SUBJECT.to_string(), completion.trim().to_string())
    }
}
