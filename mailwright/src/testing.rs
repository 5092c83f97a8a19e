//! Testing utilities for the workflow
//!
//! Provides scripted service clients that record every call and can hold a
//! call open until the test releases it, which is how single-flight behavior
//! is exercised without a network.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use mailwright::testing::{ScriptedDeliveryClient, ScriptedGenerationClient};
//! use mailwright::{GeneratedEmail, Stage, WorkflowController};
//!
//! # async fn example() {
//! let generation = ScriptedGenerationClient::succeeding(GeneratedEmail::new("Hi", "Body"));
//! let delivery = ScriptedDeliveryClient::confirming();
//! let ctl = WorkflowController::new(Arc::new(generation.clone()), Arc::new(delivery));
//!
//! ctl.set_prompt("Say hi");
//! ctl.set_generation_credential("k1");
//! ctl.request_generation().await;
//!
//! assert_eq!(generation.call_count(), 1);
//! assert_eq!(ctl.stage(), Stage::Preview);
//! # }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::client::{DeliveryClient, DeliveryReceipt, DeliveryRequest, GenerationClient};
use crate::draft::GeneratedEmail;
use crate::error::ServiceError;
use crate::form::Credential;

/// Holds scripted calls open until released
#[derive(Debug, Clone, Default)]
pub struct Gate {
    notify: Arc<Notify>,
}

impl Gate {
    /// Let one waiting (or the next) call complete
    pub fn release(&self) {
        self.notify.notify_one();
    }

    async fn wait(&self) {
        self.notify.notified().await;
    }
}

/// Generation client returning a fixed result
#[derive(Debug, Clone)]
pub struct ScriptedGenerationClient {
    result: Result<GeneratedEmail, ServiceError>,
    prompts: Arc<Mutex<Vec<String>>>,
    gate: Option<Gate>,
}

impl ScriptedGenerationClient {
    /// Every call returns `email`
    #[must_use]
    pub fn succeeding(email: GeneratedEmail) -> Self {
        Self {
            result: Ok(email),
            prompts: Arc::default(),
            gate: None,
        }
    }

    /// Every call fails with `error`
    #[must_use]
    pub fn failing(error: ServiceError) -> Self {
        Self {
            result: Err(error),
            prompts: Arc::default(),
            gate: None,
        }
    }

    /// Hold each call until `gate` is released
    #[must_use]
    pub fn gated(mut self, gate: &Gate) -> Self {
        self.gate = Some(gate.clone());
        self
    }

    /// Number of calls started so far
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.prompts.lock().len()
    }

    /// Prompts received, in order
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl GenerationClient for ScriptedGenerationClient {
    async fn generate(
        &self,
        prompt: &str,
        _credential: &Credential,
    ) -> Result<GeneratedEmail, ServiceError> {
        self.prompts.lock().push(prompt.to_string());
        if let Some(gate) = &self.gate {
            gate.wait().await;
        }
        self.result.clone()
    }
}

/// Delivery client returning a fixed result
#[derive(Debug, Clone)]
pub struct ScriptedDeliveryClient {
    result: Option<Result<DeliveryReceipt, ServiceError>>,
    requests: Arc<Mutex<Vec<DeliveryRequest>>>,
    gate: Option<Gate>,
}

impl ScriptedDeliveryClient {
    /// Every call confirms all requested recipients
    #[must_use]
    pub fn confirming() -> Self {
        Self {
            result: None,
            requests: Arc::default(),
            gate: None,
        }
    }

    /// Every call returns `receipt`
    #[must_use]
    pub fn returning(receipt: DeliveryReceipt) -> Self {
        Self {
            result: Some(Ok(receipt)),
            ..Self::confirming()
        }
    }

    /// Every call fails with `error`
    #[must_use]
    pub fn failing(error: ServiceError) -> Self {
        Self {
            result: Some(Err(error)),
            ..Self::confirming()
        }
    }

    /// Hold each call until `gate` is released
    #[must_use]
    pub fn gated(mut self, gate: &Gate) -> Self {
        self.gate = Some(gate.clone());
        self
    }

    /// Number of calls started so far
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Requests received, in order
    #[must_use]
    pub fn requests(&self) -> Vec<DeliveryRequest> {
        self.requests.lock().clone()
    }

    /// The most recent request
    #[must_use]
    pub fn last_request(&self) -> Option<DeliveryRequest> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait]
impl DeliveryClient for ScriptedDeliveryClient {
    async fn send(&self, request: DeliveryRequest) -> Result<DeliveryReceipt, ServiceError> {
        let confirmed_count = request.recipients.len();
        self.requests.lock().push(request);
        if let Some(gate) = &self.gate {
            gate.wait().await;
        }
        self.result.clone().unwrap_or_else(|| {
            Ok(DeliveryReceipt {
                confirmed_count,
                message: format!("Email sent successfully via SMTP to {confirmed_count} recipient(s)"),
            })
        })
    }
}
