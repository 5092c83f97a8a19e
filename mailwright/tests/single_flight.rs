//! Integration tests for the controller's single-flight guard
//!
//! A gated scripted client holds the first call open so a second action can
//! be issued while it is outstanding.

use std::sync::Arc;

use mailwright::testing::{Gate, ScriptedDeliveryClient, ScriptedGenerationClient};
use mailwright::{ActionOutcome, GeneratedEmail, NotificationKind, Stage, WorkflowController};

fn email() -> GeneratedEmail {
    GeneratedEmail::new("Invoice Follow-up", "Hi team,...")
}

#[tokio::test]
async fn test_second_generation_while_in_flight_is_ignored() {
    let gate = Gate::default();
    let generation = ScriptedGenerationClient::succeeding(email()).gated(&gate);
    let ctl = WorkflowController::new(
        Arc::new(generation.clone()),
        Arc::new(ScriptedDeliveryClient::confirming()),
    );
    ctl.set_prompt("Follow up on invoice");
    ctl.set_generation_credential("k1");

    let first = ctl.request_generation();
    let second = async {
        // let the first call reach the gate
        tokio::task::yield_now().await;
        assert!(ctl.is_in_flight());
        let outcome = ctl.request_generation().await;
        gate.release();
        outcome
    };

    let (first, second) = tokio::join!(first, second);

    assert_eq!(first, ActionOutcome::Completed);
    assert_eq!(second, ActionOutcome::Busy);
    assert_eq!(generation.call_count(), 1);
    assert!(!ctl.is_in_flight());
    assert_eq!(ctl.stage(), Stage::Preview);
}

#[tokio::test]
async fn test_delivery_blocked_while_generation_in_flight() {
    let gate = Gate::default();
    let generation = ScriptedGenerationClient::succeeding(email()).gated(&gate);
    let delivery = ScriptedDeliveryClient::confirming();
    let ctl = WorkflowController::new(Arc::new(generation.clone()), Arc::new(delivery.clone()));

    // a first successful round so delivery preconditions hold
    gate.release();
    ctl.set_prompt("Follow up on invoice");
    ctl.set_generation_credential("k1");
    assert!(ctl.request_generation().await.is_completed());

    ctl.set_recipient(0, "a@x.com").unwrap();
    ctl.set_sender_email("me@x.com");
    ctl.set_sender_credential("p");

    let regenerate = ctl.request_generation();
    let deliver = async {
        tokio::task::yield_now().await;
        let outcome = ctl.request_delivery().await;
        gate.release();
        outcome
    };

    let (regenerated, delivered) = tokio::join!(regenerate, deliver);

    assert_eq!(regenerated, ActionOutcome::Completed);
    assert_eq!(delivered, ActionOutcome::Busy);
    assert_eq!(generation.call_count(), 2);
    assert_eq!(delivery.call_count(), 0);
}

#[tokio::test]
async fn test_busy_does_not_replace_notification() {
    let gate = Gate::default();
    let delivery = ScriptedDeliveryClient::confirming().gated(&gate);
    let generation = ScriptedGenerationClient::succeeding(email());
    let ctl = WorkflowController::new(Arc::new(generation), Arc::new(delivery.clone()));

    ctl.set_prompt("Follow up on invoice");
    ctl.set_generation_credential("k1");
    ctl.request_generation().await;
    ctl.set_recipient(0, "a@x.com").unwrap();
    ctl.set_sender_email("me@x.com");
    ctl.set_sender_credential("p");
    ctl.dismiss_notification();

    let first = ctl.request_delivery();
    let second = async {
        tokio::task::yield_now().await;
        let outcome = ctl.request_delivery().await;
        assert!(ctl.notification().is_none());
        gate.release();
        outcome
    };
    let (first, second) = tokio::join!(first, second);

    assert!(first.is_completed());
    assert_eq!(second, ActionOutcome::Busy);
    assert_eq!(delivery.call_count(), 1);
    assert_eq!(ctl.notification().unwrap().kind, NotificationKind::Success);
}

#[tokio::test]
async fn test_flag_clears_after_failure_and_retry_is_allowed() {
    let generation = ScriptedGenerationClient::failing(mailwright::ServiceError::Status {
        status: 502,
        detail: Some("Network error occurred".to_string()),
    });
    let ctl = WorkflowController::new(
        Arc::new(generation.clone()),
        Arc::new(ScriptedDeliveryClient::confirming()),
    );
    ctl.set_prompt("Follow up on invoice");
    ctl.set_generation_credential("k1");

    assert!(matches!(ctl.request_generation().await, ActionOutcome::Failed(_)));
    assert!(!ctl.is_in_flight());
    assert!(matches!(ctl.request_generation().await, ActionOutcome::Failed(_)));
    assert_eq!(generation.call_count(), 2);
}
