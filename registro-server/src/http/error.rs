//! API error types with IntoResponse
//!
//! Errors are converted to `{ "error": "<message>" }` bodies with the
//! matching status code. The message is the [`DirectoryError`] display text.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::models::ValidationError;
use crate::service::DirectoryError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub struct ApiError(DirectoryError);

impl ApiError {
    /// Status for the wrapped error:
    /// - validation failures and duplicate email: 400
    /// - unknown id: 404
    /// - storage failures: 500
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DirectoryError::Validation(_) | DirectoryError::DuplicateEmail => StatusCode::BAD_REQUEST,
            DirectoryError::NotFound { .. } => StatusCode::NOT_FOUND,
            DirectoryError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self.0 {
            DirectoryError::Storage(message) => tracing::error!("Storage error: {}", message),
            DirectoryError::NotFound { id } => tracing::debug!(id, "usuario not found"),
            _ => {}
        }

        let body = json!({ "error": self.0.to_string() });
        (self.status(), Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self(DirectoryError::Validation(e))
    }
}

impl From<DirectoryError> for ApiError {
    fn from(e: DirectoryError) -> Self {
        Self(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_error_is_400() {
        let response = ApiError::from(ValidationError::MissingRequired).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Nombre y email son requeridos" })
        );
    }

    #[tokio::test]
    async fn duplicate_email_is_400() {
        let response = ApiError::from(DirectoryError::DuplicateEmail).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "El email ya está registrado" })
        );
    }

    #[tokio::test]
    async fn not_found_is_404() {
        let response = ApiError::from(DirectoryError::NotFound { id: 3 }).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "Usuario no encontrado");
    }

    #[tokio::test]
    async fn storage_error_is_500_with_message() {
        let err: ApiError = DirectoryError::Storage("connection refused".into()).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], "connection refused");
    }
}
