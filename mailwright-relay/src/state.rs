//! Shared handler state

use std::sync::Arc;

use crate::completion::CompletionProvider;
use crate::mailer::Mailer;

/// Services available to every handler
#[derive(Clone)]
pub struct AppState {
    /// Text generation backend
    pub completion: Arc<dyn CompletionProvider>,

    /// SMTP backend
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Create state from the two service backends
    #[must_use]
    pub fn new(completion: Arc<dyn CompletionProvider>, mailer: Arc<dyn Mailer>) -> Self {
        Self { completion, mailer }
    }
}
