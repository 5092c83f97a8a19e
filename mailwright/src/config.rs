//! Configuration management for mailwright
//!
//! Configuration is loaded from multiple sources with clear precedence:
//!
//! 1. Environment variables (highest priority, `MAILWRIGHT_` prefix, `__` for nesting)
//! 2. `./config.toml` (development)
//! 3. `~/.config/mailwright/{service}/config.toml` (user config, XDG)
//! 4. `/etc/mailwright/{service}/config.toml` (system config)
//! 5. Hardcoded defaults (fallback)
//!
//! Environment variable format: `MAILWRIGHT_SECTION__FIELD_NAME`, for example
//! `MAILWRIGHT_CLIENT__BASE_URL=http://relay.internal:8000`.
//!
//! # Example Configuration
//!
//! ```toml
//! [client]
//! base_url = "http://127.0.0.1:8000"
//!
//! [relay_defaults]
//! host = "smtp.gmail.com"
//! port = 587
//!
//! [observability]
//! service_name = "mailwright"
//! log_json = false
//! ```
//!
//! Credentials are never read from configuration; they belong to the session.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::form::{FormState, DEFAULT_RELAY_HOST, DEFAULT_RELAY_PORT};
use crate::observability::ObservabilityConfig;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "MAILWRIGHT_";

/// Where the relay API lives
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientSettings {
    /// Base URL of the relay's HTTP API
    pub base_url: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
        }
    }
}

/// SMTP target pre-filled into new forms
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RelayDefaults {
    /// SMTP server hostname
    pub host: String,

    /// SMTP server port (usually 587 for STARTTLS)
    pub port: u16,
}

impl Default for RelayDefaults {
    fn default() -> Self {
        Self {
            host: DEFAULT_RELAY_HOST.to_string(),
            port: DEFAULT_RELAY_PORT,
        }
    }
}

/// Complete client-side configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct MailwrightConfig {
    /// Relay API location
    #[serde(default)]
    pub client: ClientSettings,

    /// Form defaults for the SMTP target
    #[serde(default)]
    pub relay_defaults: RelayDefaults,

    /// Logging settings
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl MailwrightConfig {
    /// Load configuration for a specific service
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Default configuration cannot be serialized to TOML
    /// - A configuration file cannot be parsed
    /// - Values fail type conversion
    pub fn load_for_service(service_name: &str) -> anyhow::Result<Self> {
        Ok(layered(service_name, &Self::default())?.extract()?)
    }

    /// Load configuration from a specific file
    ///
    /// # Errors
    ///
    /// Returns an error if the file contains invalid TOML or values fail type
    /// conversion
    pub fn load_from(path: &str) -> anyhow::Result<Self> {
        let config = Figment::new()
            .merge(Toml::string(&toml::to_string(&Self::default())?))
            .merge(Toml::file(path))
            .merge(env_provider())
            .extract()?;

        Ok(config)
    }

    /// A blank form seeded with the configured SMTP target
    #[must_use]
    pub fn new_form(&self) -> FormState {
        FormState::with_relay(self.relay_defaults.host.clone(), self.relay_defaults.port)
    }
}

/// Build the layered figment for `service_name` on top of `defaults`
///
/// Shared by every binary in the workspace so they all resolve files and
/// environment variables the same way.
///
/// # Errors
///
/// Returns an error if `defaults` cannot be serialized to TOML
pub fn layered<T: Serialize>(service_name: &str, defaults: &T) -> anyhow::Result<Figment> {
    let mut figment = Figment::new().merge(Toml::string(&toml::to_string(defaults)?));

    let system_config = PathBuf::from("/etc/mailwright")
        .join(service_name)
        .join("config.toml");
    if system_config.exists() {
        figment = figment.merge(Toml::file(&system_config));
    }

    let user_config = recommended_path(service_name);
    if user_config.exists() {
        figment = figment.merge(Toml::file(&user_config));
    }

    let local_config = PathBuf::from("./config.toml");
    if local_config.exists() {
        figment = figment.merge(Toml::file(&local_config));
    }

    Ok(figment.merge(env_provider()))
}

/// Get the recommended XDG config path for a service
///
/// ```rust
/// let path = mailwright::config::recommended_path("mailwright");
/// assert!(path.ends_with("config.toml"));
/// ```
#[must_use]
pub fn recommended_path(service_name: &str) -> PathBuf {
    dirs::config_dir().map_or_else(
        || PathBuf::from("./config.toml"),
        |config_dir| {
            config_dir
                .join("mailwright")
                .join(service_name)
                .join("config.toml")
        },
    )
}

fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).split("__").lowercase(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_config() {
        let config = MailwrightConfig::default();
        assert_eq!(config.client.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.relay_defaults.host, "smtp.gmail.com");
        assert_eq!(config.relay_defaults.port, 587);
        assert_eq!(config.observability.service_name, "mailwright");
    }

    #[test]
    fn test_new_form_uses_relay_defaults() {
        let mut config = MailwrightConfig::default();
        config.relay_defaults.host = "smtp.example.com".to_string();
        config.relay_defaults.port = 2525;

        let form = config.new_form();
        assert_eq!(form.relay_host, "smtp.example.com");
        assert_eq!(form.relay_port, 2525);
        assert_eq!(form.recipients().len(), 1);
    }

    #[test]
    fn test_load_from_file_and_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                r#"
                [client]
                base_url = "http://relay.internal:9000"

                [relay_defaults]
                port = 465
                "#,
            )?;
            jail.set_env("MAILWRIGHT_RELAY_DEFAULTS__HOST", "smtp.office365.com");

            let config = MailwrightConfig::load_from("custom.toml").map_err(|e| e.to_string())?;
            assert_eq!(config.client.base_url, "http://relay.internal:9000");
            assert_eq!(config.relay_defaults.port, 465);
            assert_eq!(config.relay_defaults.host, "smtp.office365.com");
            Ok(())
        });
    }

    #[test]
    fn test_local_config_file_is_layered() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [observability]
                log_json = true
                "#,
            )?;

            let config = MailwrightConfig::load_for_service("jail-test").map_err(|e| e.to_string())?;
            assert!(config.observability.log_json);
            assert_eq!(config.client, ClientSettings::default());
            Ok(())
        });
    }
}
