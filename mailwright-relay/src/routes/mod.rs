//! HTTP handlers and the validated JSON extractor they share

pub mod generate;
pub mod health;
pub mod models;
pub mod send;

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::RelayError;

/// JSON body that has been deserialized and validated
///
/// Malformed bodies and validation failures are both rejected with 422 and
/// a `detail` message.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync + 'static,
{
    type Rejection = RelayError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| RelayError::Unprocessable(rejection.body_text()))?;

        data.validate()
            .map_err(|errors| RelayError::Unprocessable(first_validation_message(&errors)))?;

        Ok(Self(data))
    }
}

/// First human-readable message in `errors`
#[must_use]
pub fn first_validation_message(errors: &validator::ValidationErrors) -> String {
    for (field, field_errors) in errors.field_errors() {
        if let Some(error) = field_errors.first() {
            return error.message.as_ref().map_or_else(
                || format!("{field}: {}", error.code),
                ToString::to_string,
            );
        }
    }
    errors.to_string()
}
