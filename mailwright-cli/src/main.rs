//! mailwright CLI tool

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mailwright::{observability, MailwrightConfig};
use mailwright_cli::commands::{ComposeArgs, ComposeCommand, HealthCommand};

#[derive(Parser)]
#[command(name = "mailwright")]
#[command(version)]
#[command(about = "Generate emails with an LLM and send them over SMTP", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the layered lookup)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Emit logs to the terminal
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose, preview and send an email interactively
    Compose(ComposeArgs),
    /// Check that the relay is up
    Health {
        /// Relay base URL (overrides configuration)
        #[arg(long)]
        api_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => MailwrightConfig::load_from(path)
            .with_context(|| format!("Failed to load configuration from {path}"))?,
        None => MailwrightConfig::load_for_service("mailwright")
            .context("Failed to load configuration")?,
    };

    if cli.verbose {
        observability::init(&config.observability)?;
    }

    match cli.command {
        Commands::Compose(args) => ComposeCommand::new(args).execute(&config).await?,
        Commands::Health { api_url } => HealthCommand::new(api_url).execute(&config).await?,
    }

    Ok(())
}
