//! `POST /api/send-email-smtp`

use std::borrow::Cow;

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use mailwright::form::{DEFAULT_RELAY_HOST, DEFAULT_RELAY_PORT};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateEmail, ValidationError};

use super::ValidatedJson;
use crate::error::RelayError;
use crate::mailer::{MailerError, OutgoingEmail, SmtpTarget};
use crate::state::AppState;

fn default_smtp_server() -> String {
    DEFAULT_RELAY_HOST.to_string()
}

const fn default_smtp_port() -> u16 {
    DEFAULT_RELAY_PORT
}

/// Delivery request body
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendEmailRequest {
    /// Addresses to deliver to, one message each
    #[validate(
        length(min = 1, message = "Recipients list cannot be empty"),
        custom(function = "valid_addresses")
    )]
    pub recipients: Vec<String>,

    /// Subject line
    pub subject: String,

    /// Plain-text body
    pub content: String,

    /// SMTP login and `From` address
    #[serde(default)]
    pub sender_email: Option<String>,

    /// SMTP password
    #[serde(default)]
    pub sender_password: Option<String>,

    /// SMTP host
    #[serde(default = "default_smtp_server")]
    pub smtp_server: String,

    /// SMTP port
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
}

/// Delivery response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendEmailResponse {
    /// Always true; failures are reported as errors
    pub success: bool,

    /// Summary for display
    pub message: String,

    /// Recipients the server accepted
    pub sent_to: Vec<String>,

    /// When delivery finished
    pub sent_at: DateTime<Utc>,
}

fn valid_addresses(recipients: &[String]) -> Result<(), ValidationError> {
    match recipients.iter().find(|address| !address.validate_email()) {
        Some(address) => {
            let mut error = ValidationError::new("email");
            error.message = Some(Cow::Owned(format!("Invalid email address: {address}")));
            Err(error)
        }
        None => Ok(()),
    }
}

/// Credentials present and non-empty, or `None`
fn sender(request: &SendEmailRequest) -> Option<(String, String)> {
    let email = request.sender_email.as_deref().filter(|s| !s.is_empty())?;
    let password = request.sender_password.as_deref().filter(|s| !s.is_empty())?;
    Some((email.to_string(), password.to_string()))
}

/// Deliver an email over SMTP with the sender's own credentials
///
/// # Errors
///
/// - 422 when recipients are missing or malformed
/// - 400 when sender credentials are missing
/// - 401 when the SMTP server rejects the login
/// - 500 on other SMTP failures or when no recipient was accepted
pub async fn send_email_smtp(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SendEmailRequest>,
) -> Result<Json<SendEmailResponse>, RelayError> {
    let (username, password) = sender(&request).ok_or_else(|| {
        RelayError::BadRequest("Sender email and password are required for SMTP sending".to_string())
    })?;

    let target = SmtpTarget {
        host: request.smtp_server.clone(),
        port: request.smtp_port,
        username,
        password,
    };
    let email = OutgoingEmail {
        subject: request.subject,
        body: request.content,
    };

    let sent_to = state
        .mailer
        .deliver(&target, &email, &request.recipients)
        .await
        .map_err(|e| match e {
            MailerError::Authentication => RelayError::Unauthorized(
                "SMTP authentication failed. Check your email and password.".to_string(),
            ),
            MailerError::Smtp(reason) => {
                tracing::error!(error = %reason, "SMTP error");
                RelayError::internal(format!("SMTP error: {reason}"))
            }
            MailerError::InvalidAddress(address) => {
                tracing::error!(address = %address, "Unexpected SMTP error");
                RelayError::internal("Failed to send email via SMTP")
            }
        })?;

    if sent_to.is_empty() {
        return Err(RelayError::internal(
            "Failed to send email to any recipients via SMTP",
        ));
    }

    Ok(Json(SendEmailResponse {
        success: true,
        message: format!(
            "Email sent successfully via SMTP to {} recipient(s)",
            sent_to.len()
        ),
        sent_to,
        sent_at: Utc::now(),
    }))
}
