use sqlx::SqlitePool;

use crate::features::shared::{Paginated, PaginationParams};
use crate::models::{ActingUser, DataSetSummary, UserProfile};
use crate::storage::Storage;

#[derive(Debug, thiserror::Error)]
pub enum UserQueryError {
    #[error("User {0} not found")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Load a user's profile and attach their upload staging folder
pub async fn get_acting_user(
    pool: &SqlitePool,
    storage: &Storage,
    user_id: i64,
) -> Result<ActingUser, UserQueryError> {
    let profile = sqlx::query_as::<_, UserProfile>(
        "SELECT p.name, p.surname, p.affiliation, p.orcid
         FROM users u JOIN user_profiles p ON p.user_id = u.id
         WHERE u.id = ?",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(UserQueryError::NotFound(user_id))?;

    Ok(ActingUser {
        id: user_id,
        profile,
        temp_folder: storage.temp_folder(user_id),
    })
}

/// Public datasets of a user, newest first
///
/// Anonymous datasets have no `user_id` and never show up here.
#[tracing::instrument(skip(pool))]
pub async fn list_user_datasets(
    pool: &SqlitePool,
    user_id: i64,
    params: PaginationParams,
) -> Result<Paginated<DataSetSummary>, UserQueryError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = ?)")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    if !exists {
        return Err(UserQueryError::NotFound(user_id));
    }

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM data_sets WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    let items = sqlx::query_as::<_, DataSetSummary>(
        "SELECT ds.id, ds.user_id, ds.is_anonymous, ds.created_at, m.title, m.dataset_doi
         FROM data_sets ds JOIN ds_meta_data m ON m.id = ds.ds_meta_data_id
         WHERE ds.user_id = ?
         ORDER BY ds.created_at DESC, ds.id DESC
         LIMIT ? OFFSET ?",
    )
    .bind(user_id)
    .bind(params.per_page())
    .bind(params.offset())
    .fetch_all(pool)
    .await?;

    Ok(Paginated::from_items(items, &params, total))
}
