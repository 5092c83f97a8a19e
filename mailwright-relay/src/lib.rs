//! HTTP relay for mailwright
//!
//! Generates email text with Groq and delivers it over SMTP, using the
//! credentials each caller supplies. The relay itself holds no secrets.
//!
//! | Route | Handler |
//! |-------|---------|
//! | `GET /health` | [`routes::health::health_check`] |
//! | `POST /api/generate-email` | [`routes::generate::generate_email`] |
//! | `POST /api/send-email-smtp` | [`routes::send::send_email_smtp`] |
//! | `GET /api/groq-models` | [`routes::models::groq_models`] |
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mailwright_relay::{app, completion::GroqProvider, config::RelayConfig, mailer::SmtpMailer, AppState};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = RelayConfig::load()?;
//! let state = AppState::new(Arc::new(GroqProvider::new(config.groq.clone())?), Arc::new(SmtpMailer));
//! let listener = tokio::net::TcpListener::bind(config.server.bind_addr()).await?;
//! axum::serve(listener, app(state)).await?;
//! # Ok(())
//! # }
//! ```

pub mod completion;
pub mod config;
pub mod error;
pub mod mailer;
pub mod routes;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use error::RelayError;
pub use state::AppState;

/// Build the relay router
///
/// CORS is permissive since browser front-ends are served from other
/// origins.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api/generate-email", post(routes::generate::generate_email))
        .route("/api/send-email-smtp", post(routes::send::send_email_smtp))
        .route("/api/groq-models", get(routes::models::groq_models))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
