//! Error types for the composition workflow
//!
//! Two families exist: [`ValidationError`] is raised locally before any
//! network call, [`ServiceError`] is raised when a remote call fails or
//! returns a non-success status. Neither escapes the controller; both are
//! converted into a notification at the operation boundary.

use thiserror::Error;

/// Local precondition failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Prompt or generation credential is blank
    #[error("missing prompt or credential")]
    MissingPromptOrCredential,

    /// Delivery requested before any email was generated
    #[error("no generated email to send")]
    NoGeneratedEmail,

    /// Every recipient slot is blank
    #[error("at least one recipient is required")]
    NoRecipients,

    /// Sender mailbox or its credential is blank
    #[error("missing sender email or password")]
    MissingSenderCredentials,

    /// Recipient index outside the current list
    #[error("recipient index {index} out of range (len {len})")]
    RecipientOutOfRange {
        /// Requested index
        index: usize,
        /// Current list length
        len: usize,
    },
}

/// Failures reported by, or on the way to, a remote service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The request never produced a response (connect, TLS, timeout)
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status
    #[error("service returned HTTP {status}")]
    Status {
        /// HTTP status code
        status: u16,
        /// `detail` field of the error body, when the service sent one
        detail: Option<String>,
    },

    /// The success body could not be decoded
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl ServiceError {
    /// Create a transport error from a string message
    #[must_use]
    pub fn transport<T: Into<String>>(msg: T) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a decode error from a string message
    #[must_use]
    pub fn decode<T: Into<String>>(msg: T) -> Self {
        Self::Decode(msg.into())
    }

    /// Human-readable detail supplied by the service, if any
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Status { detail, .. } => detail.as_deref().filter(|d| !d.trim().is_empty()),
            Self::Transport(_) | Self::Decode(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            ValidationError::MissingPromptOrCredential.to_string(),
            "missing prompt or credential"
        );
        assert_eq!(
            ValidationError::RecipientOutOfRange { index: 3, len: 1 }.to_string(),
            "recipient index 3 out of range (len 1)"
        );
    }

    #[test]
    fn test_detail_only_from_status() {
        let err = ServiceError::Status {
            status: 500,
            detail: Some("auth failed".to_string()),
        };
        assert_eq!(err.detail(), Some("auth failed"));

        assert_eq!(ServiceError::transport("refused").detail(), None);
        assert_eq!(ServiceError::decode("eof").detail(), None);
    }

    #[test]
    fn test_blank_detail_is_ignored() {
        let err = ServiceError::Status {
            status: 500,
            detail: Some("   ".to_string()),
        };
        assert_eq!(err.detail(), None);
    }
}
