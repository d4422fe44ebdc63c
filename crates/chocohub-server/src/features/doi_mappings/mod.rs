//! Old-to-new DOI redirects
//!
//! - `GET /api/v1/doi-mappings/:doi` - the DOI that replaced `doi`
//!
//! DOIs contain slashes, so the route captures the rest of the path.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::api::response::ApiResponse;
use crate::error::{AppError, AppResult};
use crate::features::FeatureState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoiMapping {
    pub dataset_doi_old: String,
    pub dataset_doi_new: String,
}

/// The DOI that replaced `old_doi`, if it was ever remapped
pub async fn get_new_doi(pool: &SqlitePool, old_doi: &str) -> sqlx::Result<Option<String>> {
    sqlx::query_scalar("SELECT dataset_doi_new FROM doi_mappings WHERE dataset_doi_old = ?")
        .bind(old_doi)
        .fetch_optional(pool)
        .await
}

pub fn doi_mapping_routes() -> Router<FeatureState> {
    Router::new().route("/*doi", get(lookup))
}

async fn lookup(
    State(state): State<FeatureState>,
    Path(doi): Path<String>,
) -> AppResult<Json<ApiResponse<DoiMapping>>> {
    let new = get_new_doi(&state.db, &doi)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No mapping for DOI '{doi}'")))?;

    Ok(Json(ApiResponse::success(DoiMapping {
        dataset_doi_old: doi,
        dataset_doi_new: new,
    })))
}
