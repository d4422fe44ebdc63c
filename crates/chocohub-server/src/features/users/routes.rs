//! User routes
//!
//! - `GET /api/v1/users/:id/datasets` - a user's public datasets, paginated

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde_json::json;

use super::queries::{list_user_datasets, UserQueryError};
use crate::api::response::ApiResponse;
use crate::error::{AppError, AppResult};
use crate::features::shared::PaginationParams;
use crate::features::FeatureState;
use crate::models::DataSetSummary;

pub fn users_routes() -> Router<FeatureState> {
    Router::new().route("/:id/datasets", get(list_datasets))
}

#[tracing::instrument(skip(state))]
async fn list_datasets(
    State(state): State<FeatureState>,
    Path(user_id): Path<i64>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Vec<DataSetSummary>>>> {
    let page = list_user_datasets(&state.db, user_id, params).await?;
    let meta = json!({ "pagination": page.pagination });
    Ok(Json(ApiResponse::success_with_meta(page.items, meta)))
}

impl From<UserQueryError> for AppError {
    fn from(err: UserQueryError) -> Self {
        match err {
            UserQueryError::NotFound(id) => AppError::NotFound(format!("User {id} not found")),
            UserQueryError::Database(e) => AppError::Database(e),
        }
    }
}
