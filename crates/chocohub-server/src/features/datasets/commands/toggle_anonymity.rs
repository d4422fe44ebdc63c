//! Toggle dataset anonymity
//!
//! Going anonymous clears the public `user_id` and removes every dataset
//! author. Going public restores `user_id` to the owner and leaves exactly
//! one author, derived from the owner's profile.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::features::authors::{delete_dataset_authors, insert_authors, list_dataset_authors, AuthorOwner};
use crate::models::{ActingUser, AuthorRecord, DataSetRecord};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ToggleAnonymityCommand {
    pub dataset_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleAnonymityResponse {
    pub dataset_id: i64,
    pub is_anonymous: bool,
    pub user_id: Option<i64>,
    pub authors: Vec<AuthorRecord>,
}

#[derive(Debug, thiserror::Error)]
pub enum ToggleAnonymityError {
    #[error("Dataset {0} not found")]
    NotFound(i64),

    #[error("User {user_id} does not own dataset {dataset_id}")]
    PermissionDenied { dataset_id: i64, user_id: i64 },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[tracing::instrument(skip(pool, user), fields(user_id = user.id, dataset_id = command.dataset_id))]
pub async fn handle(
    pool: &SqlitePool,
    user: &ActingUser,
    command: ToggleAnonymityCommand,
) -> Result<ToggleAnonymityResponse, ToggleAnonymityError> {
    let mut tx = pool.begin().await?;

    let dataset = sqlx::query_as::<_, DataSetRecord>(
        "SELECT id, owner_id, user_id, ds_meta_data_id, is_anonymous, created_at
         FROM data_sets WHERE id = ?",
    )
    .bind(command.dataset_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(ToggleAnonymityError::NotFound(command.dataset_id))?;

    if !dataset.is_owned_by(user.id) {
        tracing::warn!(owner_id = dataset.owner_id, "Anonymity toggle refused");
        return Err(ToggleAnonymityError::PermissionDenied {
            dataset_id: dataset.id,
            user_id: user.id,
        });
    }

    let is_anonymous = !dataset.is_anonymous;
    let user_id = (!is_anonymous).then_some(user.id);

    delete_dataset_authors(&mut tx, dataset.ds_meta_data_id).await?;
    if !is_anonymous {
        insert_authors(
            &mut tx,
            AuthorOwner::DataSet(dataset.ds_meta_data_id),
            &[user.main_author()],
            0,
        )
        .await?;
    }

    sqlx::query("UPDATE data_sets SET is_anonymous = ?, user_id = ? WHERE id = ?")
        .bind(is_anonymous)
        .bind(user_id)
        .bind(dataset.id)
        .execute(&mut *tx)
        .await?;

    let authors = list_dataset_authors(&mut tx, dataset.ds_meta_data_id).await?;
    tx.commit().await?;

    tracing::info!(is_anonymous, "Dataset anonymity toggled");

    Ok(ToggleAnonymityResponse {
        dataset_id: dataset.id,
        is_anonymous,
        user_id,
        authors,
    })
}
