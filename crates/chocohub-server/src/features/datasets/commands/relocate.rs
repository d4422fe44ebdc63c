//! Move a committed dataset's files out of the uploader's temp folder

use std::path::PathBuf;

use crate::models::ActingUser;
use crate::storage::{Storage, StorageError};

/// Move each named file from `user.temp_folder` into the dataset directory
///
/// Must only run after the dataset has been committed. The directory is
/// keyed by the uploader's id whether or not the dataset is anonymous.
#[tracing::instrument(skip(storage, user, filenames), fields(user_id = user.id))]
pub async fn relocate_feature_models<'a>(
    storage: &Storage,
    user: &ActingUser,
    dataset_id: i64,
    filenames: impl IntoIterator<Item = &'a str>,
) -> Result<Vec<PathBuf>, StorageError> {
    let dest_dir = storage.dataset_dir(user.id, dataset_id);

    let mut moved = Vec::new();
    for name in filenames {
        moved.push(storage.move_into(&user.temp_folder.join(name), &dest_dir).await?);
    }

    tracing::info!(files = moved.len(), dest = %dest_dir.display(), "Feature models relocated");
    Ok(moved)
}
