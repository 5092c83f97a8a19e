//! mailwright relay server

use std::sync::Arc;

use anyhow::Context;
use mailwright_relay::{app, completion::GroqProvider, config::RelayConfig, mailer::SmtpMailer, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = RelayConfig::load().context("failed to load relay configuration")?;
    mailwright::observability::init(&config.observability)?;

    let completion = GroqProvider::new(config.groq.clone()).context("failed to build Groq client")?;
    let state = AppState::new(Arc::new(completion), Arc::new(SmtpMailer));

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(addr = %addr, model = %config.groq.model, "mailwright relay listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("mailwright relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
