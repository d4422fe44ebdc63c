//! Users as seen by the hub: acting-user resolution and profile listings

pub mod queries;
pub mod routes;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::features::shared::ActingUserId;
use crate::features::FeatureState;
use crate::models::ActingUser;

pub use queries::{get_acting_user, list_user_datasets, UserQueryError};
pub use routes::users_routes;

/// Resolve the `x-user-id` header to a full [`ActingUser`]
///
/// Unknown ids are rejected the same way as a missing header.
#[axum::async_trait]
impl FromRequestParts<FeatureState> for ActingUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &FeatureState,
    ) -> Result<Self, Self::Rejection> {
        let ActingUserId(id) = ActingUserId::from_request_parts(parts, state).await?;

        get_acting_user(&state.db, &state.storage, id)
            .await
            .map_err(|e| match e {
                UserQueryError::NotFound(_) => {
                    AppError::Unauthorized("Authentication required".to_string())
                },
                UserQueryError::Database(e) => AppError::Database(e),
            })
    }
}
