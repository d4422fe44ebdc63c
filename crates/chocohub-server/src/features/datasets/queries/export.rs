//! Zip export of every synchronized dataset
//!
//! The archive holds one top-level folder per dataset, named after its
//! title, with the dataset directory's files below it at their relative
//! paths.

use chrono::{Local, NaiveDate};
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;
use zip::{result::ZipError, write::SimpleFileOptions, CompressionMethod, ZipWriter};

use super::synchronized::{get_synchronized_datasets, SynchronizedDataset, SynchronizedError};
use crate::storage::Storage;

const ARCHIVE_PREFIX: &str = "chocohub2_datasets_from_";

const TEMP_DIR_PREFIX: &str = "chocohub-export-";

/// A finished archive inside its own temporary directory
///
/// The directory and the archive are deleted when this value is dropped.
#[derive(Debug)]
pub struct DatasetArchive {
    pub file_name: String,
    pub path: PathBuf,
    pub temp_dir: TempDir,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Synchronized(#[from] SynchronizedError),

    #[error("Failed to walk dataset directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Failed to write archive: {0}")]
    Zip(#[from] ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// `chocohub2_datasets_from_<DD_MM_YYYY>.zip`
pub fn archive_file_name(date: NaiveDate) -> String {
    format!("{ARCHIVE_PREFIX}{}.zip", date.format("%d_%m_%Y"))
}

/// Top-level folder for a dataset inside the archive
///
/// The title is used as is unless an earlier dataset already took it, in
/// which case the dataset id is appended.
fn folder_name(dataset: &SynchronizedDataset, taken: &mut HashSet<String>) -> String {
    if taken.insert(dataset.name.clone()) {
        return dataset.name.clone();
    }

    let folder = format!("{} ({})", dataset.name, dataset.dataset_id);
    tracing::warn!(
        dataset_id = dataset.dataset_id,
        title = %dataset.name,
        folder = %folder,
        "Duplicate dataset title in export"
    );
    taken.insert(folder.clone());
    folder
}

/// Write `datasets` into `<dest_dir>/<file_name>`
pub fn build_archive(
    datasets: &[SynchronizedDataset],
    dest_dir: &Path,
    file_name: &str,
) -> Result<PathBuf, ExportError> {
    let zip_path = dest_dir.join(file_name);
    let mut writer = ZipWriter::new(File::create(&zip_path)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut folders = HashSet::new();
    let mut written = HashSet::new();

    for dataset in datasets {
        let folder = folder_name(dataset, &mut folders);
        for entry in WalkDir::new(&dataset.path).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(rel) = entry.path().strip_prefix(&dataset.path) else {
                continue;
            };
            let name = format!("{folder}/{}", rel.to_string_lossy().replace('\\', "/"));
            if !written.insert(name.clone()) {
                tracing::warn!(entry = %name, "Skipping duplicate archive entry");
                continue;
            }

            writer.start_file(name, options)?;
            std::io::copy(&mut File::open(entry.path())?, &mut writer)?;
        }
    }

    writer.finish()?;
    Ok(zip_path)
}

/// Build today's archive of all synchronized datasets in a fresh temp directory
#[tracing::instrument(skip_all)]
pub async fn generate_datasets_and_name_zip(
    pool: &SqlitePool,
    storage: &Storage,
) -> Result<DatasetArchive, ExportError> {
    let datasets = get_synchronized_datasets(pool, storage).await?;

    let temp_dir = tempfile::Builder::new().prefix(TEMP_DIR_PREFIX).tempdir()?;
    let file_name = archive_file_name(Local::now().date_naive());

    let path = {
        let dest_dir = temp_dir.path().to_path_buf();
        let file_name = file_name.clone();
        tokio::task::spawn_blocking(move || build_archive(&datasets, &dest_dir, &file_name)).await??
    };

    tracing::info!(archive = %path.display(), "Dataset archive generated");

    Ok(DatasetArchive {
        file_name,
        path,
        temp_dir,
    })
}
