//! mailwright: compose emails with an LLM, review them, send them over SMTP
//!
//! The heart of the crate is [`WorkflowController`], which owns a single
//! session and walks it through three stages:
//!
//! 1. **Compose**: the user writes a prompt and supplies a generation key
//! 2. **Preview**: the generated subject and body can be edited in place
//! 3. **Send**: recipients and sender identity are filled in and the email is
//!    dispatched through the relay
//!
//! The controller validates every action before it reaches the network,
//! keeps at most one remote call in flight, and reports every outcome
//! through a single auto-expiring [`Notification`].
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use mailwright::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = MailwrightConfig::load_for_service("mailwright")?;
//!     let client = HttpRelayClient::new(&config.client.base_url);
//!     let ctl = WorkflowController::from_client(client, config.new_form());
//!
//!     ctl.set_prompt("Follow up on the March invoice");
//!     ctl.set_generation_credential(std::env::var("GROQ_API_KEY")?);
//!     ctl.request_generation().await;
//!
//!     if let Some(email) = ctl.generated() {
//!         println!("{}\n\n{}", email.subject, email.body);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod draft;
pub mod error;
pub mod form;
pub mod notification;
pub mod observability;
pub mod testing;
pub mod workflow;

pub use client::{DeliveryClient, DeliveryReceipt, DeliveryRequest, GenerationClient, HttpRelayClient, RelayHealth};
pub use config::MailwrightConfig;
pub use draft::GeneratedEmail;
pub use error::{ServiceError, ValidationError};
pub use form::{Credential, FormState};
pub use notification::{Notification, NotificationChannel, NotificationKind};
pub use workflow::{ActionOutcome, SessionView, Stage, WorkflowController};

pub mod prelude {
    //! Convenience re-exports for common types and traits
    //!
    //! ```rust
    //! use mailwright::prelude::*;
    //! ```

    pub use crate::client::{
        DeliveryClient, DeliveryReceipt, DeliveryRequest, GenerationClient, HttpRelayClient,
    };
    pub use crate::config::MailwrightConfig;
    pub use crate::draft::GeneratedEmail;
    pub use crate::error::{ServiceError, ValidationError};
    pub use crate::form::{Credential, FormState};
    pub use crate::notification::{Notification, NotificationKind};
    pub use crate::workflow::{ActionOutcome, SessionView, Stage, WorkflowController};
}
