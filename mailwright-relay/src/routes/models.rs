//! `GET /api/groq-models`

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;

use crate::completion::CompletionError;
use crate::error::RelayError;
use crate::state::AppState;

/// Query string for the model listing
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsQuery {
    /// Caller's Groq API key
    pub api_key: String,
}

/// Proxy Groq's model list for the caller's key
///
/// # Errors
///
/// - 422 when `api_key` is missing
/// - 400 when Groq answers with a non-200 status
/// - 500 for anything else
pub async fn groq_models(
    State(state): State<AppState>,
    query: Result<Query<ModelsQuery>, QueryRejection>,
) -> Result<Json<serde_json::Value>, RelayError> {
    let Query(query) = query.map_err(|rejection| RelayError::Unprocessable(rejection.body_text()))?;

    let models = state
        .completion
        .list_models(&query.api_key)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Error fetching Groq models");
            match e {
                CompletionError::Status { .. } => {
                    RelayError::BadRequest("Failed to fetch models from Groq API".to_string())
                }
                _ => RelayError::internal("Failed to fetch available models"),
            }
        })?;

    Ok(Json(models))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::MockCompletionProvider;
    use crate::mailer::MockMailer;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn server(completion: MockCompletionProvider) -> TestServer {
        let state = AppState::new(Arc::new(completion), Arc::new(MockMailer::new()));
        TestServer::new(crate::app(state)).unwrap()
    }

    #[tokio::test]
    async fn test_models_passthrough() {
        let mut completion = MockCompletionProvider::new();
        completion
            .expect_list_models()
            .withf(|key| key.to_string() == "k1")
            .returning(|_| Ok(json!({"data": [{"id": "llama3-8b-8192"}]})));

        let response = server(completion)
            .get("/api/groq-models")
            .add_query_param("api_key", "k1")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"][0]["id"], "llama3-8b-8192");
    }

    #[tokio::test]
    async fn test_upstream_rejection_is_400() {
        let mut completion = MockCompletionProvider::new();
        completion.expect_list_models().returning(|_| {
            Err(CompletionError::Status {
                status: 401,
                body: String::new(),
            })
        });

        let response = server(completion)
            .get("/api/groq-models")
            .add_query_param("api_key", "bad")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["detail"], "Failed to fetch models from Groq API");
    }

    #[tokio::test]
    async fn test_network_failure_is_500() {
        let mut completion = MockCompletionProvider::new();
        completion
            .expect_list_models()
            .returning(|_| Err(CompletionError::Network("timeout".to_string())));

        let response = server(completion)
            .get("/api/groq-models")
            .add_query_param("api_key", "k")
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json();
        assert_eq!(body["detail"], "Failed to fetch available models");
    }

    #[tokio::test]
    async fn test_missing_key_is_422() {
        let response = server(MockCompletionProvider::new()).get("/api/groq-models").await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
}
