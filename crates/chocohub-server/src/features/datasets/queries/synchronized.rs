//! Synchronization-state queries
//!
//! A dataset is synchronized once its database row is committed. On disk,
//! its files live under `uploads/user_<id>/dataset_<id>/`; directories with
//! no committed row (for example left over from a crashed upload) are not
//! synchronized and are ignored.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::path::PathBuf;

use crate::models::DataSetSummary;
use crate::storage::{Storage, StorageError};

/// How many datasets the "latest" listing returns
pub const LATEST_LIMIT: i64 = 5;

/// A synchronized dataset together with its directory on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynchronizedDataset {
    pub dataset_id: i64,
    /// Display name, the dataset title
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum SynchronizedError {
    #[error("Failed to scan uploads: {0}")]
    Storage(#[from] StorageError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub async fn is_synchronized(pool: &SqlitePool, dataset_id: i64) -> sqlx::Result<bool> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM data_sets WHERE id = ?)")
        .bind(dataset_id)
        .fetch_one(pool)
        .await
}

pub async fn count_synchronized_datasets(pool: &SqlitePool) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM data_sets")
        .fetch_one(pool)
        .await
}

pub async fn get_dataset_name(pool: &SqlitePool, dataset_id: i64) -> sqlx::Result<Option<String>> {
    sqlx::query_scalar(
        "SELECT m.title FROM data_sets ds JOIN ds_meta_data m ON m.id = ds.ds_meta_data_id
         WHERE ds.id = ?",
    )
    .bind(dataset_id)
    .fetch_optional(pool)
    .await
}

/// The most recently created datasets, anonymous ones included
pub async fn latest_synchronized(pool: &SqlitePool) -> sqlx::Result<Vec<DataSetSummary>> {
    sqlx::query_as(
        "SELECT ds.id, ds.user_id, ds.is_anonymous, ds.created_at, m.title, m.dataset_doi
         FROM data_sets ds JOIN ds_meta_data m ON m.id = ds.ds_meta_data_id
         ORDER BY ds.created_at DESC, ds.id DESC LIMIT ?",
    )
    .bind(LATEST_LIMIT)
    .fetch_all(pool)
    .await
}

/// Dataset directories on disk that have a committed row, with their titles
#[tracing::instrument(skip_all)]
pub async fn get_synchronized_datasets(
    pool: &SqlitePool,
    storage: &Storage,
) -> Result<Vec<SynchronizedDataset>, SynchronizedError> {
    let dirs = storage.scan_dataset_dirs().await?;

    let mut synchronized = Vec::with_capacity(dirs.len());
    for dir in dirs {
        match get_dataset_name(pool, dir.dataset_id).await? {
            Some(name) => synchronized.push(SynchronizedDataset {
                dataset_id: dir.dataset_id,
                name,
                path: dir.path,
            }),
            None => tracing::debug!(path = %dir.path.display(), "Skipping orphaned dataset directory"),
        }
    }

    Ok(synchronized)
}
