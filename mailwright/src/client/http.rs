//! HTTP implementation of the service contracts
//!
//! Talks to the relay's JSON endpoints with `reqwest`:
//!
//! - `POST {base}/api/generate-email`
//! - `POST {base}/api/send-email-smtp`
//! - `GET {base}/health`
//!
//! Error bodies follow the `{ "detail": "..." }` shape. A `detail` that is
//! not a string (e.g. a list of field errors) is dropped so callers fall back
//! to their generic message.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::{DeliveryClient, DeliveryReceipt, DeliveryRequest, GenerationClient};
use crate::draft::GeneratedEmail;
use crate::error::ServiceError;
use crate::form::Credential;

const GENERATE_PATH: &str = "/api/generate-email";
const SEND_PATH: &str = "/api/send-email-smtp";
const HEALTH_PATH: &str = "/health";

/// Relay liveness report
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RelayHealth {
    /// `"healthy"` when the relay is serving
    pub status: String,
    /// Relay version
    pub version: String,
    /// When the relay answered, as sent
    pub timestamp: String,
}

#[derive(Serialize)]
struct GenerateEmailBody<'a> {
    prompt: &'a str,
    groq_api_key: &'a str,
}

#[derive(Deserialize)]
struct GenerateEmailReply {
    subject: String,
    content: String,
}

#[derive(Serialize)]
struct SendEmailBody<'a> {
    recipients: &'a [String],
    subject: &'a str,
    content: &'a str,
    sender_email: &'a str,
    sender_password: &'a str,
    smtp_server: &'a str,
    smtp_port: u16,
}

#[derive(Deserialize)]
struct SendEmailReply {
    message: String,
    sent_to: Vec<String>,
}

#[derive(Deserialize)]
struct ErrorReply {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

/// Client for the relay's generation and delivery endpoints
#[derive(Debug, Clone)]
pub struct HttpRelayClient {
    http: Client,
    base_url: String,
}

impl HttpRelayClient {
    /// Create a client for the relay at `base_url` (e.g. `http://127.0.0.1:8000`)
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a client reusing an existing `reqwest::Client`
    #[must_use]
    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    /// Base URL requests are sent to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Ask the relay whether it is up
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the relay cannot be reached or answers with
    /// a non-success status
    pub async fn health(&self) -> Result<RelayHealth, ServiceError> {
        let response = self
            .http
            .get(self.url(HEALTH_PATH))
            .send()
            .await
            .map_err(|e| ServiceError::transport(e.to_string()))?;

        Self::check_http_response(response).await
    }

    /// Check status and decode the JSON body
    async fn check_http_response<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<ErrorReply>()
                .await
                .ok()
                .and_then(|body| body.detail)
                .and_then(|detail| match detail {
                    serde_json::Value::String(s) => Some(s),
                    _ => None,
                });
            return Err(ServiceError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ServiceError::decode(e.to_string()))
    }
}

#[async_trait]
impl GenerationClient for HttpRelayClient {
    async fn generate(
        &self,
        prompt: &str,
        credential: &Credential,
    ) -> Result<GeneratedEmail, ServiceError> {
        let body = GenerateEmailBody {
            prompt,
            groq_api_key: credential.expose(),
        };

        let response = self
            .http
            .post(self.url(GENERATE_PATH))
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::transport(e.to_string()))?;

        let reply: GenerateEmailReply = Self::check_http_response(response).await?;
        Ok(GeneratedEmail::new(reply.subject, reply.content))
    }
}

#[async_trait]
impl DeliveryClient for HttpRelayClient {
    async fn send(&self, request: DeliveryRequest) -> Result<DeliveryReceipt, ServiceError> {
        let body = SendEmailBody {
            recipients: &request.recipients,
            subject: &request.subject,
            content: &request.body,
            sender_email: &request.sender_email,
            sender_password: request.sender_credential.expose(),
            smtp_server: &request.host,
            smtp_port: request.port,
        };

        let response = self
            .http
            .post(self.url(SEND_PATH))
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::transport(e.to_string()))?;

        let reply: SendEmailReply = Self::check_http_response(response).await?;
        Ok(DeliveryReceipt {
            confirmed_count: reply.sent_to.len(),
            message: reply.message,
        })
    }
}
