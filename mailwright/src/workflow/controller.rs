//! The composition workflow controller
//!
//! [`WorkflowController`] owns the whole session: form, generated email,
//! stage, notification and the in-flight flag. Every mutation goes through
//! its methods. Methods take `&self` so a front-end can hold the controller
//! in an `Arc` and issue actions from several places; the state lock is never
//! held across a remote call.
//!
//! # Single flight
//!
//! At most one remote call is outstanding across the controller. Both
//! [`request_generation`](WorkflowController::request_generation) and
//! [`request_delivery`](WorkflowController::request_delivery) check and set
//! the same flag before calling out, and an action issued while the flag is
//! set returns [`ActionOutcome::Busy`] without touching the network or the
//! notification slot.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::Stage;
use crate::client::{DeliveryClient, DeliveryReceipt, DeliveryRequest, GenerationClient};
use crate::draft::GeneratedEmail;
use crate::error::{ServiceError, ValidationError};
use crate::form::{Credential, FormState};
use crate::notification::{Notification, NotificationChannel, NotificationKind};

/// Shown after a successful generation
pub const GENERATION_SUCCESS_MESSAGE: &str = "Email generated successfully!";

/// Shown after any failed generation; service details are not surfaced
pub const GENERATION_FAILURE_MESSAGE: &str = "Failed to generate email. Please try again.";

/// Shown after a failed delivery when the service gave no detail
pub const DELIVERY_FAILURE_MESSAGE: &str = "Failed to send email. Please try again.";

/// What happened to a requested action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The remote call succeeded and state was updated
    Completed,
    /// A precondition failed; no call was made
    Invalid(ValidationError),
    /// The remote call failed
    Failed(ServiceError),
    /// Another call was in flight; the action was ignored
    Busy,
}

impl ActionOutcome {
    /// Whether the remote call went through and succeeded
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Point-in-time copy of the session for rendering
#[derive(Debug, Clone)]
pub struct SessionView {
    /// Active stage
    pub stage: Stage,
    /// Form fields
    pub form: FormState,
    /// Last generated email, if any
    pub generated: Option<GeneratedEmail>,
    /// Visible notification, if any
    pub notification: Option<Notification>,
    /// Whether a remote call is outstanding
    pub in_flight: bool,
}

#[derive(Debug, Default)]
struct Session {
    stage: Stage,
    form: FormState,
    generated: Option<GeneratedEmail>,
    notifications: NotificationChannel,
    in_flight: bool,
}

/// Clears the in-flight flag when the call settles
struct InFlight<'a> {
    session: &'a Mutex<Session>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.session.lock().in_flight = false;
    }
}

/// Orchestrates compose → preview → send
pub struct WorkflowController {
    generation: Arc<dyn GenerationClient>,
    delivery: Arc<dyn DeliveryClient>,
    session: Mutex<Session>,
}

impl std::fmt::Debug for WorkflowController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowController")
            .field("session", &*self.session.lock())
            .finish_non_exhaustive()
    }
}

impl WorkflowController {
    /// Create a controller with a blank form
    #[must_use]
    pub fn new(generation: Arc<dyn GenerationClient>, delivery: Arc<dyn DeliveryClient>) -> Self {
        Self::with_form(generation, delivery, FormState::default())
    }

    /// Create a controller with a pre-filled form
    #[must_use]
    pub fn with_form(
        generation: Arc<dyn GenerationClient>,
        delivery: Arc<dyn DeliveryClient>,
        form: FormState,
    ) -> Self {
        Self {
            generation,
            delivery,
            session: Mutex::new(Session {
                form,
                ..Session::default()
            }),
        }
    }

    /// Create a controller whose calls both go to one client
    #[must_use]
    pub fn from_client<C>(client: C, form: FormState) -> Self
    where
        C: GenerationClient + DeliveryClient + 'static,
    {
        let client = Arc::new(client);
        Self::with_form(client.clone(), client, form)
    }

    // ----- stage navigation ------------------------------------------------

    /// Active stage
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.session.lock().stage
    }

    /// Switch to any stage, regardless of what data exists
    pub fn select_stage(&self, stage: Stage) {
        let mut session = self.session.lock();
        debug!(from = %session.stage, to = %stage, "stage selected");
        session.stage = stage;
    }

    /// Go back to compose (preview's "edit", or the jump from an empty panel)
    pub fn back_to_compose(&self) {
        self.select_stage(Stage::Compose);
    }

    /// Move on from preview to send
    pub fn continue_to_send(&self) {
        self.select_stage(Stage::Send);
    }

    // ----- form ------------------------------------------------------------

    /// Copy of the current form
    #[must_use]
    pub fn form(&self) -> FormState {
        self.session.lock().form.clone()
    }

    /// Set the generation prompt
    pub fn set_prompt(&self, prompt: impl Into<String>) {
        self.session.lock().form.prompt = prompt.into();
    }

    /// Set the generation API key
    pub fn set_generation_credential(&self, credential: impl Into<Credential>) {
        self.session.lock().form.generation_credential = credential.into();
    }

    /// Set the sending mailbox
    pub fn set_sender_email(&self, email: impl Into<String>) {
        self.session.lock().form.sender_email = email.into();
    }

    /// Set the sending mailbox password
    pub fn set_sender_credential(&self, credential: impl Into<Credential>) {
        self.session.lock().form.sender_credential = credential.into();
    }

    /// Set the SMTP server and port the relay should use
    pub fn set_relay_target(&self, host: impl Into<String>, port: u16) {
        let mut session = self.session.lock();
        session.form.relay_host = host.into();
        session.form.relay_port = port;
    }

    /// Replace the recipient at `index`
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::RecipientOutOfRange`] if `index` is not a
    /// current slot.
    pub fn set_recipient(&self, index: usize, value: impl Into<String>) -> Result<(), ValidationError> {
        self.session.lock().form.set_recipient(index, value)
    }

    /// Append a blank recipient slot
    pub fn add_recipient(&self) {
        self.session.lock().form.add_recipient();
    }

    /// Remove a recipient slot; the last slot is never removed
    pub fn remove_recipient(&self, index: usize) -> bool {
        self.session.lock().form.remove_recipient(index)
    }

    // ----- generated email ----------------------------------------------------

    /// Copy of the last generated email
    #[must_use]
    pub fn generated(&self) -> Option<GeneratedEmail> {
        self.session.lock().generated.clone()
    }

    /// Edit the generated subject in place; `false` if nothing was generated yet
    pub fn set_subject(&self, subject: impl Into<String>) -> bool {
        self.session
            .lock()
            .generated
            .as_mut()
            .map(|email| email.subject = subject.into())
            .is_some()
    }

    /// Edit the generated body in place; `false` if nothing was generated yet
    pub fn set_body(&self, body: impl Into<String>) -> bool {
        self.session
            .lock()
            .generated
            .as_mut()
            .map(|email| email.body = body.into())
            .is_some()
    }

    // ----- notifications ---------------------------------------------------

    /// Visible notification, if it has not expired
    #[must_use]
    pub fn notification(&self) -> Option<Notification> {
        self.session.lock().notifications.current().cloned()
    }

    /// Dismiss the visible notification
    pub fn dismiss_notification(&self) {
        self.session.lock().notifications.clear();
    }

    /// Whether a remote call is outstanding
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.session.lock().in_flight
    }

    /// Copy of everything a front-end needs to render
    #[must_use]
    pub fn snapshot(&self) -> SessionView {
        let mut session = self.session.lock();
        let notification = session.notifications.current().cloned();
        SessionView {
            stage: session.stage,
            form: session.form.clone(),
            generated: session.generated.clone(),
            notification,
            in_flight: session.in_flight,
        }
    }

    // ----- actions -----------------------------------------------------------

    /// Generate an email from the prompt
    ///
    /// On success the result replaces any previous generated email and the
    /// stage moves to [`Stage::Preview`]. On failure nothing but the
    /// notification changes.
    pub async fn request_generation(&self) -> ActionOutcome {
        let (prompt, credential) = {
            let mut session = self.session.lock();
            if !session.form.can_generate() {
                return Self::reject(&mut session, ValidationError::MissingPromptOrCredential);
            }
            if session.in_flight {
                debug!("generation ignored: request already in flight");
                return ActionOutcome::Busy;
            }
            session.in_flight = true;
            (
                session.form.prompt.clone(),
                session.form.generation_credential.clone(),
            )
        };
        let _in_flight = InFlight {
            session: &self.session,
        };

        debug!(prompt_len = prompt.len(), "requesting generation");
        let result = self.generation.generate(&prompt, &credential).await;

        let mut session = self.session.lock();
        match result {
            Ok(email) => {
                info!(subject = %email.subject, "email generated");
                session.generated = Some(email);
                session.stage = Stage::Preview;
                session
                    .notifications
                    .raise(GENERATION_SUCCESS_MESSAGE, NotificationKind::Success);
                ActionOutcome::Completed
            }
            Err(err) => {
                warn!(error = %err, "email generation failed");
                session
                    .notifications
                    .raise(GENERATION_FAILURE_MESSAGE, NotificationKind::Error);
                ActionOutcome::Failed(err)
            }
        }
    }

    /// Send the generated email to every non-blank recipient
    ///
    /// The stage never changes. Blank recipient slots are never sent.
    pub async fn request_delivery(&self) -> ActionOutcome {
        let request = {
            let mut session = self.session.lock();
            let request = match Self::delivery_request(&session) {
                Ok(request) => request,
                Err(err) => return Self::reject(&mut session, err),
            };
            if session.in_flight {
                debug!("delivery ignored: request already in flight");
                return ActionOutcome::Busy;
            }
            session.in_flight = true;
            request
        };
        let _in_flight = InFlight {
            session: &self.session,
        };

        debug!(recipients = request.recipients.len(), host = %request.host, port = request.port, "requesting delivery");
        let result = self.delivery.send(request).await;

        let mut session = self.session.lock();
        match result {
            Ok(DeliveryReceipt { confirmed_count, .. }) => {
                info!(confirmed_count, "email delivered");
                session.notifications.raise(
                    format!("Email sent successfully to {confirmed_count} recipient(s)!"),
                    NotificationKind::Success,
                );
                ActionOutcome::Completed
            }
            Err(err) => {
                warn!(error = %err, "email delivery failed");
                let message = err.detail().unwrap_or(DELIVERY_FAILURE_MESSAGE).to_string();
                session.notifications.raise(message, NotificationKind::Error);
                ActionOutcome::Failed(err)
            }
        }
    }

    fn delivery_request(session: &Session) -> Result<DeliveryRequest, ValidationError> {
        let email = session
            .generated
            .as_ref()
            .ok_or(ValidationError::NoGeneratedEmail)?;

        let recipients = session.form.filled_recipients();
        if recipients.is_empty() {
            return Err(ValidationError::NoRecipients);
        }

        if !session.form.has_sender() {
            return Err(ValidationError::MissingSenderCredentials);
        }

        Ok(DeliveryRequest {
            recipients,
            subject: email.subject.clone(),
            body: email.body.clone(),
            sender_email: session.form.sender_email.trim().to_string(),
            sender_credential: session.form.sender_credential.clone(),
            host: session.form.relay_host.clone(),
            port: session.form.relay_port,
        })
    }

    fn reject(session: &mut Session, err: ValidationError) -> ActionOutcome {
        debug!(error = %err, "action rejected");
        session
            .notifications
            .raise(err.to_string(), NotificationKind::Error);
        ActionOutcome::Invalid(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{MockDeliveryClient, MockGenerationClient};

    fn controller(generation: MockGenerationClient, delivery: MockDeliveryClient) -> WorkflowController {
        WorkflowController::new(Arc::new(generation), Arc::new(delivery))
    }

    fn ready_to_send(generation: MockGenerationClient, delivery: MockDeliveryClient) -> WorkflowController {
        let ctl = controller(generation, delivery);
        ctl.session.lock().generated = Some(GeneratedEmail::new("Invoice Follow-up", "Hi team,..."));
        ctl.set_recipient(0, "a@x.com").unwrap();
        ctl.set_sender_email("me@x.com");
        ctl.set_sender_credential("p");
        ctl
    }

    #[tokio::test]
    async fn test_generation_success_moves_to_preview() {
        let mut generation = MockGenerationClient::new();
        generation
            .expect_generate()
            .withf(|prompt, credential| {
                prompt.to_string() == "Follow up on invoice" && credential.expose() == "k1"
            })
            .times(1)
            .returning(|_, _| Ok(GeneratedEmail::new("Invoice Follow-up", "Hi team,...")));
        let ctl = controller(generation, MockDeliveryClient::new());

        ctl.set_prompt("Follow up on invoice");
        ctl.set_generation_credential("k1");
        let outcome = ctl.request_generation().await;

        assert_eq!(outcome, ActionOutcome::Completed);
        assert_eq!(ctl.stage(), Stage::Preview);
        assert_eq!(
            ctl.generated(),
            Some(GeneratedEmail::new("Invoice Follow-up", "Hi team,..."))
        );
        let notification = ctl.notification().unwrap();
        assert_eq!(notification.kind, NotificationKind::Success);
        assert!(!ctl.is_in_flight());
    }

    #[tokio::test]
    async fn test_generation_blank_prompt_never_calls_service() {
        let mut generation = MockGenerationClient::new();
        generation.expect_generate().never();
        let ctl = controller(generation, MockDeliveryClient::new());

        ctl.set_prompt("   ");
        ctl.set_generation_credential("k1");
        let outcome = ctl.request_generation().await;

        assert_eq!(
            outcome,
            ActionOutcome::Invalid(ValidationError::MissingPromptOrCredential)
        );
        let notification = ctl.notification().unwrap();
        assert_eq!(notification.kind, NotificationKind::Error);
        assert_eq!(notification.message, "missing prompt or credential");
        assert_eq!(ctl.stage(), Stage::Compose);
    }

    #[tokio::test]
    async fn test_generation_blank_credential_never_calls_service() {
        let mut generation = MockGenerationClient::new();
        generation.expect_generate().never();
        let ctl = controller(generation, MockDeliveryClient::new());

        ctl.set_prompt("Write to the team");
        let outcome = ctl.request_generation().await;

        assert!(matches!(outcome, ActionOutcome::Invalid(_)));
        assert_eq!(ctl.notification().unwrap().kind, NotificationKind::Error);
    }

    #[tokio::test]
    async fn test_generation_failure_keeps_previous_email() {
        let mut generation = MockGenerationClient::new();
        generation.expect_generate().times(1).returning(|_, _| {
            Err(ServiceError::Status {
                status: 400,
                detail: Some("Failed to generate email. API error: 401".to_string()),
            })
        });
        let ctl = controller(generation, MockDeliveryClient::new());
        let previous = GeneratedEmail::new("Old", "Old body");
        ctl.session.lock().generated = Some(previous.clone());

        ctl.set_prompt("new prompt");
        ctl.set_generation_credential("k1");
        let outcome = ctl.request_generation().await;

        assert!(matches!(outcome, ActionOutcome::Failed(_)));
        assert_eq!(ctl.generated(), Some(previous));
        assert_eq!(ctl.stage(), Stage::Compose);
        let notification = ctl.notification().unwrap();
        assert_eq!(notification.kind, NotificationKind::Error);
        assert_eq!(notification.message, GENERATION_FAILURE_MESSAGE);
        assert!(!ctl.is_in_flight());
    }

    #[tokio::test]
    async fn test_delivery_without_generated_email_never_calls_service() {
        let mut delivery = MockDeliveryClient::new();
        delivery.expect_send().never();
        let ctl = controller(MockGenerationClient::new(), delivery);
        ctl.set_recipient(0, "a@x.com").unwrap();
        ctl.set_sender_email("me@x.com");
        ctl.set_sender_credential("p");

        let outcome = ctl.request_delivery().await;

        assert_eq!(outcome, ActionOutcome::Invalid(ValidationError::NoGeneratedEmail));
        assert_eq!(ctl.notification().unwrap().kind, NotificationKind::Error);
    }

    #[tokio::test]
    async fn test_delivery_with_blank_recipients_never_calls_service() {
        let mut delivery = MockDeliveryClient::new();
        delivery.expect_send().never();
        let ctl = ready_to_send(MockGenerationClient::new(), delivery);
        ctl.set_recipient(0, "  ").unwrap();
        ctl.add_recipient();
        ctl.set_recipient(1, "\t").unwrap();

        let outcome = ctl.request_delivery().await;

        assert_eq!(outcome, ActionOutcome::Invalid(ValidationError::NoRecipients));
        let notification = ctl.notification().unwrap();
        assert_eq!(notification.kind, NotificationKind::Error);
        assert_eq!(notification.message, "at least one recipient is required");
    }

    #[tokio::test]
    async fn test_delivery_without_sender_never_calls_service() {
        let mut delivery = MockDeliveryClient::new();
        delivery.expect_send().never();
        let ctl = ready_to_send(MockGenerationClient::new(), delivery);
        ctl.set_sender_credential("");

        let outcome = ctl.request_delivery().await;

        assert_eq!(
            outcome,
            ActionOutcome::Invalid(ValidationError::MissingSenderCredentials)
        );
        let notification = ctl.notification().unwrap();
        assert_eq!(notification.kind, NotificationKind::Error);
        assert_eq!(notification.message, "missing sender email or password");
    }

    #[tokio::test]
    async fn test_delivery_skips_blank_slots_and_reports_count() {
        let mut delivery = MockDeliveryClient::new();
        delivery
            .expect_send()
            .withf(|request| {
                request.recipients == vec!["a@x.com".to_string()]
                    && request.subject == "Invoice Follow-up"
                    && request.sender_email == "me@x.com"
                    && request.sender_credential.expose() == "p"
                    && request.host == "smtp.gmail.com"
                    && request.port == 587
            })
            .times(1)
            .returning(|_| {
                Ok(DeliveryReceipt {
                    confirmed_count: 1,
                    message: "ok".to_string(),
                })
            });
        let ctl = ready_to_send(MockGenerationClient::new(), delivery);
        ctl.add_recipient();
        ctl.continue_to_send();

        let outcome = ctl.request_delivery().await;

        assert_eq!(outcome, ActionOutcome::Completed);
        assert_eq!(ctl.stage(), Stage::Send);
        let notification = ctl.notification().unwrap();
        assert_eq!(notification.kind, NotificationKind::Success);
        assert_eq!(notification.message, "Email sent successfully to 1 recipient(s)!");
    }

    #[tokio::test]
    async fn test_delivery_failure_uses_service_detail() {
        let mut delivery = MockDeliveryClient::new();
        delivery.expect_send().times(1).returning(|_| {
            Err(ServiceError::Status {
                status: 500,
                detail: Some("auth failed".to_string()),
            })
        });
        let ctl = ready_to_send(MockGenerationClient::new(), delivery);

        ctl.request_delivery().await;

        let notification = ctl.notification().unwrap();
        assert_eq!(notification.kind, NotificationKind::Error);
        assert_eq!(notification.message, "auth failed");
    }

    #[tokio::test]
    async fn test_delivery_failure_without_detail_uses_fallback() {
        let mut delivery = MockDeliveryClient::new();
        delivery.expect_send().times(1).returning(|_| {
            Err(ServiceError::Status {
                status: 500,
                detail: None,
            })
        });
        let ctl = ready_to_send(MockGenerationClient::new(), delivery);

        ctl.request_delivery().await;

        let notification = ctl.notification().unwrap();
        assert_eq!(notification.kind, NotificationKind::Error);
        assert_eq!(notification.message, DELIVERY_FAILURE_MESSAGE);
        assert!(!ctl.is_in_flight());
    }

    #[tokio::test]
    async fn test_delivery_sends_edited_fields() {
        let mut delivery = MockDeliveryClient::new();
        delivery
            .expect_send()
            .withf(|request| request.subject == "Edited" && request.body == "New body")
            .times(1)
            .returning(|request| {
                Ok(DeliveryReceipt {
                    confirmed_count: request.recipients.len(),
                    message: "ok".to_string(),
                })
            });
        let ctl = ready_to_send(MockGenerationClient::new(), delivery);

        assert!(ctl.set_subject("Edited"));
        assert!(ctl.set_body("New body"));
        assert!(ctl.request_delivery().await.is_completed());
    }

    #[test]
    fn test_edits_without_generated_email() {
        let ctl = controller(MockGenerationClient::new(), MockDeliveryClient::new());
        assert!(!ctl.set_subject("x"));
        assert!(!ctl.set_body("y"));
        assert!(ctl.generated().is_none());
    }

    #[test]
    fn test_manual_navigation_ignores_data() {
        let ctl = controller(MockGenerationClient::new(), MockDeliveryClient::new());
        ctl.select_stage(Stage::Send);
        assert_eq!(ctl.stage(), Stage::Send);
        ctl.back_to_compose();
        assert_eq!(ctl.stage(), Stage::Compose);
        ctl.select_stage(Stage::Preview);
        ctl.continue_to_send();
        assert_eq!(ctl.stage(), Stage::Send);
    }

    #[test]
    fn test_snapshot_reflects_form() {
        let ctl = controller(MockGenerationClient::new(), MockDeliveryClient::new());
        ctl.set_prompt("hello");
        ctl.add_recipient();
        ctl.set_relay_target("smtp.example.com", 2525);

        let view = ctl.snapshot();
        assert_eq!(view.stage, Stage::Compose);
        assert_eq!(view.form.prompt, "hello");
        assert_eq!(view.form.recipients().len(), 2);
        assert_eq!(view.form.relay_host, "smtp.example.com");
        assert_eq!(view.form.relay_port, 2525);
        assert!(view.generated.is_none());
        assert!(view.notification.is_none());
        assert!(!view.in_flight);
    }

    #[test]
    fn test_remove_recipient_keeps_one_slot() {
        let ctl = controller(MockGenerationClient::new(), MockDeliveryClient::new());
        for _ in 0..5 {
            ctl.remove_recipient(0);
        }
        assert_eq!(ctl.form().recipients().len(), 1);
    }
}
