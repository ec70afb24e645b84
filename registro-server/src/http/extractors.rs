//! Custom Axum extractors

use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::request::Parts;
use axum::{Form, Json};

use super::error::ApiError;
use crate::models::{UserInput, ValidationError};

/// Extract a user id from the path.
///
/// Ids are assigned from 1 upwards, so anything that is not a positive
/// integer is rejected as `InvalidId` before reaching storage.
pub struct UserId(pub i64);

impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ValidationError::InvalidId { value: String::new() })?;

        match raw.trim().parse::<i64>() {
            Ok(id) if id > 0 => Ok(Self(id)),
            _ => Err(ValidationError::InvalidId { value: raw }.into()),
        }
    }
}

/// User write payload, accepted as JSON or as a url-encoded form post
pub struct UserPayload(pub UserInput);

impl<S> FromRequest<S> for UserPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        let input = if is_form {
            let Form(input) = Form::<UserInput>::from_request(req, state)
                .await
                .map_err(|e| ValidationError::MalformedBody { reason: e.body_text() })?;
            input
        } else {
            let Json(input) = Json::<UserInput>::from_request(req, state)
                .await
                .map_err(|e| ValidationError::MalformedBody { reason: e.body_text() })?;
            input
        };

        Ok(Self(input))
    }
}
