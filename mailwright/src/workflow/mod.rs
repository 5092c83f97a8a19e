//! Compose → preview → send workflow

mod controller;
mod stage;

pub use controller::{
    ActionOutcome, SessionView, WorkflowController, DELIVERY_FAILURE_MESSAGE,
    GENERATION_FAILURE_MESSAGE, GENERATION_SUCCESS_MESSAGE,
};
pub use stage::Stage;
