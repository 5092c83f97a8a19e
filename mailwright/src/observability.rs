//! Observability (structured logging)
//!
//! Every crate in the workspace logs through `tracing`. Binaries call
//! [`init`] once at startup. Credentials never reach a log line: they are
//! held in [`Credential`](crate::Credential), whose `Debug` is redacted, and
//! are never passed to a tracing macro.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the logging stack
///
/// Sets up:
/// - `RUST_LOG`-style filtering, falling back to `debug,mailwright=trace` in
///   debug builds and `info` in release builds
/// - Pretty formatting in development, JSON when `log_json` is set or in
///   release builds
///
/// # Example
///
/// ```rust,no_run
/// use mailwright::observability::{self, ObservabilityConfig};
///
/// # fn main() -> anyhow::Result<()> {
/// observability::init(&ObservabilityConfig::new("mailwright-cli"))?;
/// tracing::info!("Application started");
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
pub fn init(config: &ObservabilityConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            EnvFilter::new("debug,mailwright=trace")
        } else {
            EnvFilter::new("info")
        }
    });

    if config.log_json || !cfg!(debug_assertions) {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init()?;
    }

    tracing::debug!(service = %config.service_name, "logging initialized");
    Ok(())
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Service name attached to startup logs
    pub service_name: String,

    /// Force JSON log lines even in debug builds
    pub log_json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "mailwright".to_string(),
            log_json: false,
        }
    }
}

impl ObservabilityConfig {
    /// Create new observability config
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    /// Emit JSON log lines
    #[must_use]
    pub const fn with_json(mut self) -> Self {
        self.log_json = true;
        self
    }
}
