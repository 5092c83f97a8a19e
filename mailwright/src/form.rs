//! User-entered form state
//!
//! [`FormState`] holds everything the user types before a remote call: the
//! generation prompt and key, the recipient list, and the SMTP identity and
//! target used by the relay. The recipient list always keeps at least one
//! slot so there is something to type into.

use std::fmt;

use crate::error::ValidationError;

/// Default SMTP server handed to the relay
pub const DEFAULT_RELAY_HOST: &str = "smtp.gmail.com";

/// Default SMTP port handed to the relay (STARTTLS submission)
pub const DEFAULT_RELAY_PORT: u16 = 587;

/// A secret string that never shows up in `Debug` output or logs
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a secret value
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Borrow the secret for transmission
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the secret is empty after trimming
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("Credential(<empty>)")
        } else {
            f.write_str("Credential(<redacted>)")
        }
    }
}

impl From<&str> for Credential {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Credential {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Session form fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    /// Free-form instruction for generation
    pub prompt: String,

    /// API key for the generation service
    pub generation_credential: Credential,

    recipients: Vec<String>,

    /// Mailbox the relay sends from
    pub sender_email: String,

    /// Password for `sender_email`
    pub sender_credential: Credential,

    /// SMTP server the relay connects to
    pub relay_host: String,

    /// SMTP port the relay connects to
    pub relay_port: u16,
}

impl Default for FormState {
    fn default() -> Self {
        Self::with_relay(DEFAULT_RELAY_HOST, DEFAULT_RELAY_PORT)
    }
}

impl FormState {
    /// Create a blank form with the default relay target
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a blank form pointed at a specific relay target
    #[must_use]
    pub fn with_relay(host: impl Into<String>, port: u16) -> Self {
        Self {
            prompt: String::new(),
            generation_credential: Credential::default(),
            recipients: vec![String::new()],
            sender_email: String::new(),
            sender_credential: Credential::default(),
            relay_host: host.into(),
            relay_port: port,
        }
    }

    /// All recipient slots, blanks included
    #[must_use]
    pub fn recipients(&self) -> &[String] {
        &self.recipients
    }

    /// Recipient slots that contain something, trimmed, in order
    #[must_use]
    pub fn filled_recipients(&self) -> Vec<String> {
        self.recipients
            .iter()
            .map(|r| r.trim())
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Replace the recipient at `index`
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::RecipientOutOfRange`] if `index` is not a
    /// current slot.
    pub fn set_recipient(
        &mut self,
        index: usize,
        value: impl Into<String>,
    ) -> Result<(), ValidationError> {
        let len = self.recipients.len();
        let slot = self
            .recipients
            .get_mut(index)
            .ok_or(ValidationError::RecipientOutOfRange { index, len })?;
        *slot = value.into();
        Ok(())
    }

    /// Append a blank recipient slot
    pub fn add_recipient(&mut self) {
        self.recipients.push(String::new());
    }

    /// Remove the slot at `index`
    ///
    /// Returns `false` without touching the list when `index` is out of range
    /// or the slot is the last one left.
    pub fn remove_recipient(&mut self, index: usize) -> bool {
        if self.recipients.len() <= 1 || index >= self.recipients.len() {
            return false;
        }
        self.recipients.remove(index);
        true
    }

    /// Whether both prompt and generation key are filled in
    #[must_use]
    pub fn can_generate(&self) -> bool {
        !self.prompt.trim().is_empty() && !self.generation_credential.is_blank()
    }

    /// Whether both sender mailbox and password are filled in
    #[must_use]
    pub fn has_sender(&self) -> bool {
        !self.sender_email.trim().is_empty() && !self.sender_credential.is_blank()
    }
}
