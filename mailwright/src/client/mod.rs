//! Contracts with the two remote services
//!
//! The controller only talks to the outside world through
//! [`GenerationClient`] and [`DeliveryClient`]. Each invocation issues exactly
//! one request: no retry, no timeout beyond the transport default. Keeping a
//! single request outstanding is the caller's job.
//!
//! [`HttpRelayClient`] implements both traits against the relay's JSON API.

mod http;

use async_trait::async_trait;

use crate::draft::GeneratedEmail;
use crate::error::ServiceError;
use crate::form::Credential;

pub use self::http::{HttpRelayClient, RelayHealth};

/// Everything the relay needs to deliver one email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRequest {
    /// Non-blank recipients, in form order
    pub recipients: Vec<String>,
    /// Subject line
    pub subject: String,
    /// Plain-text body
    pub body: String,
    /// Sending mailbox
    pub sender_email: String,
    /// Password for the sending mailbox
    pub sender_credential: Credential,
    /// SMTP server
    pub host: String,
    /// SMTP port
    pub port: u16,
}

/// Result of a successful delivery call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// How many recipients the service confirmed
    pub confirmed_count: usize,
    /// Summary message from the service
    pub message: String,
}

/// Text-generation service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Generate an email from a natural-language prompt
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the request fails or the service answers
    /// with a non-success status
    async fn generate(
        &self,
        prompt: &str,
        credential: &Credential,
    ) -> Result<GeneratedEmail, ServiceError>;
}

/// Mail-relay service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeliveryClient: Send + Sync {
    /// Deliver an email to every recipient in `request`
    ///
    /// The call is atomic from the caller's point of view: either a receipt
    /// comes back or the whole call failed.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` carrying the service's `detail` when it sent one
    async fn send(&self, request: DeliveryRequest) -> Result<DeliveryReceipt, ServiceError>;
}
