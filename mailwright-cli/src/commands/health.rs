//! Relay liveness check

use anyhow::Result;
use console::{style, Emoji};
use mailwright::{HttpRelayClient, MailwrightConfig};

static SUCCESS: Emoji = Emoji("✓", "√");
static FAILURE: Emoji = Emoji("✗", "x");

/// Ping the relay's `/health` endpoint
pub struct HealthCommand {
    api_url: Option<String>,
}

impl HealthCommand {
    /// Create a new command instance
    #[must_use]
    pub const fn new(api_url: Option<String>) -> Self {
        Self { api_url }
    }

    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if the relay is unreachable or unhealthy
    pub async fn execute(self, config: &MailwrightConfig) -> Result<()> {
        let base_url = self
            .api_url
            .unwrap_or_else(|| config.client.base_url.clone());
        let client = HttpRelayClient::new(&base_url);

        match client.health().await {
            Ok(health) => {
                println!(
                    "{} Relay at {} is {} (version {})",
                    SUCCESS,
                    style(&base_url).cyan(),
                    style(&health.status).green().bold(),
                    health.version
                );
                Ok(())
            }
            Err(e) => {
                println!("{} Relay at {} is unreachable", FAILURE, style(&base_url).cyan());
                anyhow::bail!("health check failed: {e}")
            }
        }
    }
}
