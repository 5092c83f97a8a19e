//! Relay configuration
//!
//! Loaded through the same layered figment as the client
//! ([`mailwright::config::layered`]), plus the conventional `PORT`
//! environment variable which overrides `server.port`.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8000
//!
//! [groq]
//! base_url = "https://api.groq.com/openai/v1"
//! model = "llama3-8b-8192"
//! temperature = 0.7
//! max_tokens = 1000
//! http_timeout_secs = 30
//! ```

use std::time::Duration;

use figment::providers::Env;
use mailwright::observability::ObservabilityConfig;
use serde::{Deserialize, Serialize};

/// Listener settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerSettings {
    /// Interface to bind
    pub host: String,

    /// Port to bind
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl ServerSettings {
    /// `host:port` string for binding
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Groq chat-completion settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GroqSettings {
    /// OpenAI-compatible API root
    pub base_url: String,

    /// Model used for generation
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Completion length cap
    pub max_tokens: u32,

    /// Timeout for outbound HTTP calls, in seconds
    pub http_timeout_secs: u64,
}

impl Default for GroqSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama3-8b-8192".to_string(),
            temperature: 0.7,
            max_tokens: 1000,
            http_timeout_secs: 30,
        }
    }
}

impl GroqSettings {
    /// Outbound HTTP timeout
    #[must_use]
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// Complete relay configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RelayConfig {
    /// Listener settings
    #[serde(default)]
    pub server: ServerSettings,

    /// Groq settings
    #[serde(default)]
    pub groq: GroqSettings,

    /// Logging settings
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl RelayConfig {
    /// Service name used for config file lookup
    pub const SERVICE_NAME: &'static str = "mailwright-relay";

    /// Load configuration from files and environment
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration source cannot be parsed or values
    /// fail type conversion
    pub fn load() -> anyhow::Result<Self> {
        let config = mailwright::config::layered(Self::SERVICE_NAME, &Self::default())?
            .merge(Env::raw().only(&["port"]).map(|_| "server.port".into()))
            .extract()?;
        Ok(config)
    }
}
