//! Hub-wide counters shown on the landing page

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::synchronized::count_synchronized_datasets;
use crate::features::authors::count_authors;
use crate::features::records::{total_dataset_downloads, total_dataset_views};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubStats {
    pub datasets: i64,
    pub feature_models: i64,
    pub ds_metadata: i64,
    pub authors: i64,
    pub downloads: i64,
    pub views: i64,
}

pub async fn count_feature_models(pool: &SqlitePool) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM feature_models")
        .fetch_one(pool)
        .await
}

pub async fn count_dsmetadata(pool: &SqlitePool) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM ds_meta_data")
        .fetch_one(pool)
        .await
}

pub async fn handle(pool: &SqlitePool) -> sqlx::Result<HubStats> {
    Ok(HubStats {
        datasets: count_synchronized_datasets(pool).await?,
        feature_models: count_feature_models(pool).await?,
        ds_metadata: count_dsmetadata(pool).await?,
        authors: count_authors(pool).await?,
        downloads: total_dataset_downloads(pool).await?,
        views: total_dataset_views(pool).await?,
    })
}
