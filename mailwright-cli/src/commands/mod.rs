//! CLI command implementations

pub mod compose;
pub mod health;

pub use compose::{ComposeArgs, ComposeCommand};
pub use health::HealthCommand;
