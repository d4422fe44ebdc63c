//! Acting-user extraction
//!
//! Authentication happens upstream of this service; the authenticated user
//! id arrives in the `x-user-id` header and is handed to every operation as
//! an explicit argument.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Id of the authenticated user making the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActingUserId(pub i64);

#[axum::async_trait]
impl<S> FromRequestParts<S> for ActingUserId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<i64>().ok())
            .map(ActingUserId)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}
