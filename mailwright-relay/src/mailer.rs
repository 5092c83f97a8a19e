//! SMTP delivery
//!
//! The sender's own mailbox credentials arrive with each request, so a
//! transport is built per call rather than held by the relay.

use std::fmt;

use async_trait::async_trait;
use lettre::{
    message::{header, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;

/// SMTP server and the account to authenticate as
#[derive(Clone)]
pub struct SmtpTarget {
    /// Server hostname
    pub host: String,

    /// Server port (STARTTLS)
    pub port: u16,

    /// Login, also used as the `From` address
    pub username: String,

    /// Password or app password
    pub password: String,
}

impl fmt::Debug for SmtpTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpTarget")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Message content sent to every recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    /// Subject line
    pub subject: String,

    /// Plain-text body
    pub body: String,
}

/// SMTP failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MailerError {
    /// The server rejected the login
    #[error("SMTP authentication failed")]
    Authentication,

    /// An address could not be parsed as a mailbox
    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    /// Connection or protocol failure
    #[error("{0}")]
    Smtp(String),
}

/// Something that can deliver a message to a list of recipients
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send `email` to each of `recipients` individually
    ///
    /// Returns the recipients that were accepted. A failure for one
    /// recipient does not stop delivery to the others.
    ///
    /// # Errors
    ///
    /// Returns `MailerError` if the server cannot be reached or rejects the
    /// login
    async fn deliver(
        &self,
        target: &SmtpTarget,
        email: &OutgoingEmail,
        recipients: &[String],
    ) -> Result<Vec<String>, MailerError>;
}

/// Production SMTP mailer over STARTTLS
#[derive(Debug, Clone, Copy, Default)]
pub struct SmtpMailer;

impl SmtpMailer {
    /// Build a plain-text message from `from` to a single recipient
    ///
    /// # Errors
    ///
    /// Returns `MailerError::InvalidAddress` if either address is invalid
    pub fn build_message(from: &str, to: &str, email: &OutgoingEmail) -> Result<Message, MailerError> {
        let from: Mailbox = from
            .parse()
            .map_err(|_| MailerError::InvalidAddress(from.to_string()))?;
        let to: Mailbox = to
            .parse()
            .map_err(|_| MailerError::InvalidAddress(to.to_string()))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(email.subject.as_str())
            .header(header::ContentType::TEXT_PLAIN)
            .body(email.body.clone())
            .map_err(|e| MailerError::Smtp(e.to_string()))
    }

    fn create_transport(target: &SmtpTarget) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailerError> {
        let credentials = Credentials::new(target.username.clone(), target.password.clone());

        Ok(AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&target.host)
            .map_err(|e| MailerError::Smtp(e.to_string()))?
            .port(target.port)
            .credentials(credentials)
            .build())
    }
}

/// Map a transport error, treating 53x replies as a rejected login
fn classify(error: &lettre::transport::smtp::Error) -> MailerError {
    let rejected_login = error
        .status()
        .is_some_and(|code| code.to_string().starts_with("53"));
    if rejected_login {
        MailerError::Authentication
    } else {
        MailerError::Smtp(error.to_string())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn deliver(
        &self,
        target: &SmtpTarget,
        email: &OutgoingEmail,
        recipients: &[String],
    ) -> Result<Vec<String>, MailerError> {
        let transport = Self::create_transport(target)?;

        // connect and authenticate once up front
        transport.test_connection().await.map_err(|e| classify(&e))?;

        let mut sent_to = Vec::with_capacity(recipients.len());
        for recipient in recipients {
            let message = match Self::build_message(&target.username, recipient, email) {
                Ok(message) => message,
                Err(e) => {
                    tracing::error!(recipient = %recipient, error = %e, "Skipping recipient");
                    continue;
                }
            };

            match transport.send(message).await {
                Ok(_) => {
                    tracing::info!(recipient = %recipient, "Email sent via SMTP");
                    sent_to.push(recipient.clone());
                }
                Err(e) => {
                    tracing::error!(recipient = %recipient, error = %e, "Failed to send email via SMTP");
                }
            }
        }

        Ok(sent_to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> OutgoingEmail {
        OutgoingEmail {
            subject: "Invoice Follow-up".to_string(),
            body: "Hi team,\nPlease pay.".to_string(),
        }
    }

    #[test]
    fn test_build_message_headers() {
        let message = SmtpMailer::build_message("me@example.com", "a@example.com", &email()).unwrap();
        let formatted = String::from_utf8(message.formatted()).unwrap();

        assert!(formatted.contains("From: me@example.com"));
        assert!(formatted.contains("To: a@example.com"));
        assert!(formatted.contains("Subject: Invoice Follow-up"));
        assert!(formatted.contains("Content-Type: text/plain"));
        assert!(formatted.contains("Please pay."));
    }

    #[test]
    fn test_build_message_invalid_sender() {
        let err = SmtpMailer::build_message("not-an-email", "a@example.com", &email()).unwrap_err();
        assert_eq!(err, MailerError::InvalidAddress("not-an-email".to_string()));
    }

    #[test]
    fn test_build_message_invalid_recipient() {
        let err = SmtpMailer::build_message("me@example.com", "nope", &email()).unwrap_err();
        assert_eq!(err, MailerError::InvalidAddress("nope".to_string()));
    }

    #[test]
    fn test_target_debug_redacts_password() {
        let target = SmtpTarget {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: "me@example.com".to_string(),
            password: "hunter2".to_string(),
        };
        let debug = format!("{target:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_smtp_error() {
        let target = SmtpTarget {
            host: "127.0.0.1".to_string(),
            port: 1,
            username: "me@example.com".to_string(),
            password: "p".to_string(),
        };
        let err = SmtpMailer
            .deliver(&target, &email(), &["a@example.com".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, MailerError::Smtp(_)));
    }
}
