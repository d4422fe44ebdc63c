//! Local uploads tree
//!
//! Layout under the working directory:
//!
//! ```text
//! uploads/
//!   temp/<user_id>/<file>                      staged, not yet part of a dataset
//!   user_<user_id>/dataset_<dataset_id>/<file> committed dataset files
//! ```

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, instrument};

pub mod config;

const UPLOADS_DIR: &str = "uploads";
const TEMP_DIR: &str = "temp";
const USER_DIR_PREFIX: &str = "user_";
const DATASET_DIR_PREFIX: &str = "dataset_";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Source file not found: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("Failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A `user_<id>/dataset_<id>` directory found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetDir {
    pub user_id: i64,
    pub dataset_id: i64,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Storage {
    working_dir: PathBuf,
}

impl Storage {
    pub fn new(config: config::StorageConfig) -> Self {
        debug!(working_dir = %config.working_dir.display(), "Initializing local storage");
        Self {
            working_dir: config.working_dir,
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.working_dir.join(UPLOADS_DIR)
    }

    /// Staging folder where a user's uploads wait before dataset creation
    pub fn temp_folder(&self, user_id: i64) -> PathBuf {
        self.uploads_dir().join(TEMP_DIR).join(user_id.to_string())
    }

    /// Permanent folder of a committed dataset
    pub fn dataset_dir(&self, user_id: i64, dataset_id: i64) -> PathBuf {
        self.uploads_dir()
            .join(format!("{USER_DIR_PREFIX}{user_id}"))
            .join(format!("{DATASET_DIR_PREFIX}{dataset_id}"))
    }

    /// Move `source` into `dest_dir`, creating the directory if needed
    ///
    /// Falls back to copy-and-delete when a rename is not possible (e.g. the
    /// staging area is on another filesystem).
    #[instrument(skip(self))]
    pub async fn move_into(&self, source: &Path, dest_dir: &Path) -> Result<PathBuf, StorageError> {
        if !tokio::fs::try_exists(source).await? {
            return Err(StorageError::SourceMissing(source.to_path_buf()));
        }

        tokio::fs::create_dir_all(dest_dir)
            .await
            .map_err(|source| StorageError::CreateDir {
                path: dest_dir.to_path_buf(),
                source,
            })?;

        let file_name = source
            .file_name()
            .ok_or_else(|| StorageError::SourceMissing(source.to_path_buf()))?;
        let destination = dest_dir.join(file_name);

        if tokio::fs::rename(source, &destination).await.is_err() {
            tokio::fs::copy(source, &destination).await?;
            tokio::fs::remove_file(source).await?;
        }

        info!(destination = %destination.display(), "Moved upload");
        Ok(destination)
    }

    /// List every `uploads/user_*/dataset_*` directory
    ///
    /// Entries whose names do not parse as ids are skipped. A missing
    /// `uploads/` directory yields an empty list. The walk runs on the
    /// blocking pool.
    pub async fn scan_dataset_dirs(&self) -> Result<Vec<DatasetDir>, StorageError> {
        let uploads = self.uploads_dir();
        tokio::task::spawn_blocking(move || read_dataset_dirs(&uploads))
            .await
            .map_err(|e| StorageError::Io(std::io::Error::other(e)))?
    }
}

fn read_dataset_dirs(uploads: &Path) -> Result<Vec<DatasetDir>, StorageError> {
    if !uploads.is_dir() {
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    for user_entry in std::fs::read_dir(uploads)? {
        let user_entry = user_entry?;
        let Some(user_id) = parse_prefixed_id(&user_entry.file_name(), USER_DIR_PREFIX) else {
            continue;
        };
        if !user_entry.file_type()?.is_dir() {
            continue;
        }

        for dataset_entry in std::fs::read_dir(user_entry.path())? {
            let dataset_entry = dataset_entry?;
            let Some(dataset_id) =
                parse_prefixed_id(&dataset_entry.file_name(), DATASET_DIR_PREFIX)
            else {
                continue;
            };
            if dataset_entry.file_type()?.is_dir() {
                found.push(DatasetDir {
                    user_id,
                    dataset_id,
                    path: dataset_entry.path(),
                });
            }
        }
    }

    found.sort_by_key(|d| (d.user_id, d.dataset_id));
    Ok(found)
}

fn parse_prefixed_id(name: &std::ffi::OsStr, prefix: &str) -> Option<i64> {
    name.to_str()?.strip_prefix(prefix)?.parse().ok()
}
