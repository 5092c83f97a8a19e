//! The generated email
//!
//! Created only from a successful generation response and overwritten by the
//! next one. The user may edit subject and body in place before sending.

/// Subject and plain-text body produced by the generation service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedEmail {
    /// Subject line
    pub subject: String,

    /// Plain-text body
    pub body: String,
}

impl GeneratedEmail {
    /// Create a generated email
    #[must_use]
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
        }
    }
}
