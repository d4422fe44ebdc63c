//! Like or dislike a dataset
//!
//! Each user holds at most one review per dataset; a new vote replaces the
//! previous one. The dataset's total is the net sum of all votes.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::features::shared::error_helpers::map_foreign_key_violation;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LikeDatasetCommand {
    pub dataset_id: i64,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeDatasetResponse {
    /// Net sum of votes, serialized as a string
    pub total_likes: String,
}

#[derive(Debug, thiserror::Error)]
pub enum LikeDatasetError {
    #[error("Vote must be 1 or -1, got {0}")]
    InvalidValue(i64),

    #[error("Dataset {0} not found")]
    DatasetNotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl LikeDatasetCommand {
    pub fn validate(&self) -> Result<(), LikeDatasetError> {
        match self.value {
            1 | -1 => Ok(()),
            other => Err(LikeDatasetError::InvalidValue(other)),
        }
    }
}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: &SqlitePool,
    user_id: i64,
    command: LikeDatasetCommand,
) -> Result<LikeDatasetResponse, LikeDatasetError> {
    command.validate()?;

    sqlx::query(
        "INSERT INTO dataset_reviews (data_set_id, user_id, value) VALUES (?, ?, ?)
         ON CONFLICT (data_set_id, user_id) DO UPDATE SET value = excluded.value",
    )
    .bind(command.dataset_id)
    .bind(user_id)
    .bind(command.value)
    .execute(pool)
    .await
    .map_err(|e| {
        map_foreign_key_violation(
            e,
            LikeDatasetError::DatasetNotFound(command.dataset_id),
            LikeDatasetError::Database,
        )
    })?;

    let total = total_likes(pool, command.dataset_id).await?;
    tracing::debug!(total, "Dataset review stored");

    Ok(LikeDatasetResponse {
        total_likes: total.to_string(),
    })
}

pub async fn total_likes(pool: &SqlitePool, dataset_id: i64) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COALESCE(SUM(value), 0) FROM dataset_reviews WHERE data_set_id = ?")
        .bind(dataset_id)
        .fetch_one(pool)
        .await
}
