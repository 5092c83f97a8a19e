//! `POST /api/generate-email`

use std::borrow::Cow;

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::ValidatedJson;
use crate::completion::{split_subject, CompletionError};
use crate::error::RelayError;
use crate::state::AppState;

/// Characters of the prompt included in logs
const PROMPT_LOG_CHARS: usize = 50;

/// Generation request body
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateEmailRequest {
    /// What the email should say
    #[validate(custom(function = "non_blank"))]
    pub prompt: String,

    /// Caller's Groq API key
    pub groq_api_key: String,
}

/// Generation response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateEmailResponse {
    /// Subject line
    pub subject: String,

    /// Email body
    pub content: String,

    /// When the email was generated
    pub generated_at: DateTime<Utc>,
}

fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some(Cow::Borrowed("Prompt cannot be empty"));
        return Err(error);
    }
    Ok(())
}

/// Generate an email from a prompt with the caller's Groq key
///
/// # Errors
///
/// - 422 when the prompt is blank
/// - 400 when Groq answers with a non-200 status
/// - 502 when Groq cannot be reached
/// - 500 for anything else
pub async fn generate_email(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<GenerateEmailRequest>,
) -> Result<Json<GenerateEmailResponse>, RelayError> {
    let prompt = request.prompt.trim();
    let preview: String = prompt.chars().take(PROMPT_LOG_CHARS).collect();
    tracing::info!(prompt = %preview, "Generating email");

    let completion = state
        .completion
        .complete(&request.groq_api_key, prompt)
        .await
        .map_err(|e| match e {
            CompletionError::Status { status, .. } => {
                RelayError::BadRequest(format!("Failed to generate email. API error: {status}"))
            }
            CompletionError::Network(reason) => {
                tracing::error!(error = %reason, "Network error");
                RelayError::BadGateway("Network error occurred".to_string())
            }
            CompletionError::Malformed(reason) => {
                tracing::error!(error = %reason, "Unexpected error generating email");
                RelayError::internal("Internal server error")
            }
        })?;

    let (subject, content) = split_subject(&completion);
    tracing::info!("Email generated successfully");

    Ok(Json(GenerateEmailResponse {
        subject,
        content,
        generated_at: Utc::now(),
    }))
}
