//! Caller identity.
//!
//! Authentication lives in front of this service; it forwards the caller's
//! wallet id in the `X-Account-Id` header.

use axum::{extract::FromRequestParts, http::request::Parts};

use hire_types::{AccountId, AppError, DomainError};

use super::handlers::ApiError;

pub const ACCOUNT_HEADER: &str = "X-Account-Id";

/// The account making the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester(pub AccountId);

impl<S: Send + Sync> FromRequestParts<S> for Requester {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(ACCOUNT_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| bad_header(format!("Missing {ACCOUNT_HEADER} header")))?;

        raw.trim()
            .parse::<AccountId>()
            .map(Requester)
            .map_err(|_| bad_header(format!("Invalid {ACCOUNT_HEADER} header")))
    }
}

fn bad_header(message: String) -> ApiError {
    ApiError(AppError::Rejected(DomainError::Validation(message)))
}
