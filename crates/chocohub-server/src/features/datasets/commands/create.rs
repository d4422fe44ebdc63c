//! Create dataset command
//!
//! Builds the whole dataset aggregate (metadata, authors, feature models and
//! their files) inside one transaction. The uploaded files are only read
//! here, to compute checksums; moving them out of the temp folder is a
//! separate step that runs after the commit (see [`super::relocate`]).

use chocohub_common::{
    checksum::{calculate_checksum_and_size, FileDigest},
    types::{human_readable_size, PublicationType},
    HubError,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::features::authors::{insert_authors, AuthorOwner};
use crate::features::shared::error_helpers::map_foreign_key_violation;
use crate::features::shared::validation::{
    validate_doi, validate_filename, validate_text, DoiValidationError, FilenameValidationError,
    TextValidationError,
};
use crate::models::{ActingUser, NewAuthor};

pub const MAX_TITLE_LENGTH: usize = 120;
pub const MAX_AUTHOR_NAME_LENGTH: usize = 256;

/// Dataset upload form
///
/// # Examples
///
/// ```rust,ignore
/// let command = CreateDataSetCommand {
///     title: "Automotive product lines".to_string(),
///     description: "Feature models of car configurators".to_string(),
///     publication_type: PublicationType::JournalArticle,
///     feature_models: vec![FeatureModelSubmission::new("car.uvl")],
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateDataSetCommand {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub publication_type: PublicationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    /// Co-authors, listed after the uploader
    #[serde(default)]
    pub authors: Vec<NewAuthor>,
    #[serde(default)]
    pub anonymous: bool,
    pub feature_models: Vec<FeatureModelSubmission>,
}

/// One feature model of the form, naming a file in the user's temp folder
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureModelSubmission {
    pub uvl_filename: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub publication_type: PublicationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uvl_version: Option<String>,
    #[serde(default)]
    pub authors: Vec<NewAuthor>,
}

impl FeatureModelSubmission {
    pub fn new(uvl_filename: impl Into<String>) -> Self {
        Self {
            uvl_filename: uvl_filename.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDataSetResponse {
    pub id: i64,
    pub ds_meta_data_id: i64,
    pub title: String,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
    pub feature_models: Vec<CreatedFeatureModel>,
}

impl CreateDataSetResponse {
    pub fn filenames(&self) -> impl Iterator<Item = &str> {
        self.feature_models.iter().map(|fm| fm.uvl_filename.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedFeatureModel {
    pub id: i64,
    pub uvl_filename: String,
    pub hubfile_id: i64,
    pub checksum: String,
    pub size: u64,
    pub size_human: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateDataSetError {
    #[error("{0}")]
    Text(#[from] TextValidationError),

    #[error("{0}")]
    Filename(#[from] FilenameValidationError),

    #[error("{0}")]
    Doi(#[from] DoiValidationError),

    #[error("At least one feature model is required")]
    NoFeatureModels,

    #[error("Feature model file '{0}' is listed more than once")]
    DuplicateFilename(String),

    #[error("User {0} does not exist")]
    UnknownUser(i64),

    #[error("Uploaded file not found: {}", .0.display())]
    UploadMissing(PathBuf),

    #[error("Uploaded file '{filename}' is too large ({size} bytes)")]
    FileTooLarge { filename: String, size: u64 },

    #[error("Failed to read uploaded file: {0}")]
    Upload(HubError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<HubError> for CreateDataSetError {
    fn from(err: HubError) -> Self {
        match err {
            HubError::FileNotFound(path) => Self::UploadMissing(path),
            other => Self::Upload(other),
        }
    }
}

impl CreateDataSetCommand {
    #[tracing::instrument(skip(self), fields(title = %self.title))]
    pub fn validate(&self) -> Result<(), CreateDataSetError> {
        validate_text(&self.title, "title", MAX_TITLE_LENGTH)?;
        validate_text(&self.description, "description", usize::MAX)?;
        validate_doi(self.publication_doi.as_deref(), "publication_doi")?;
        validate_doi(self.dataset_doi.as_deref(), "dataset_doi")?;

        if self.feature_models.is_empty() {
            return Err(CreateDataSetError::NoFeatureModels);
        }

        let mut seen = HashSet::new();
        for fm in &self.feature_models {
            validate_filename(&fm.uvl_filename)?;
            validate_doi(fm.publication_doi.as_deref(), "publication_doi")?;
            if fm.title.chars().count() > MAX_TITLE_LENGTH {
                return Err(TextValidationError::TooLong {
                    field: "feature model title",
                    max_length: MAX_TITLE_LENGTH,
                }
                .into());
            }
            if !seen.insert(fm.uvl_filename.trim()) {
                return Err(CreateDataSetError::DuplicateFilename(fm.uvl_filename.clone()));
            }
        }

        for author in self.authors.iter().chain(self.feature_models.iter().flat_map(|fm| &fm.authors)) {
            validate_text(&author.name, "author name", MAX_AUTHOR_NAME_LENGTH)?;
        }

        Ok(())
    }
}

/// Create the dataset aggregate for `user`
///
/// Commits once at the end. Any failure rolls the transaction back and is
/// returned unchanged, so a failed call leaves no rows behind.
#[tracing::instrument(
    skip(pool, user, command),
    fields(user_id = user.id, title = %command.title, anonymous = command.anonymous)
)]
pub async fn handle(
    pool: &SqlitePool,
    user: &ActingUser,
    command: CreateDataSetCommand,
) -> Result<CreateDataSetResponse, CreateDataSetError> {
    command.validate()?;

    let mut tx = pool.begin().await?;

    match create_aggregate(&mut tx, user, &command).await {
        Ok(response) => {
            tx.commit().await?;
            tracing::info!(
                dataset_id = response.id,
                feature_models = response.feature_models.len(),
                "Dataset created"
            );
            Ok(response)
        },
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!(error = %rollback_err, "Rollback failed");
            }
            tracing::warn!(error = %err, "Dataset creation rolled back");
            Err(err)
        },
    }
}

async fn create_aggregate(
    conn: &mut SqliteConnection,
    user: &ActingUser,
    command: &CreateDataSetCommand,
) -> Result<CreateDataSetResponse, CreateDataSetError> {
    let ds_meta_data_id = sqlx::query(
        "INSERT INTO ds_meta_data (title, description, publication_type, publication_doi, dataset_doi, tags)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(command.title.trim())
    .bind(&command.description)
    .bind(command.publication_type.as_str())
    .bind(non_empty(&command.publication_doi))
    .bind(non_empty(&command.dataset_doi))
    .bind(non_empty(&command.tags))
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    if !command.anonymous {
        let mut authors = Vec::with_capacity(command.authors.len() + 1);
        authors.push(user.main_author());
        authors.extend(command.authors.iter().cloned());
        insert_authors(conn, AuthorOwner::DataSet(ds_meta_data_id), &authors, 0).await?;
    }

    let created_at = Utc::now();
    let user_id = (!command.anonymous).then_some(user.id);
    let dataset_id = sqlx::query(
        "INSERT INTO data_sets (owner_id, user_id, ds_meta_data_id, is_anonymous, created_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(user.id)
    .bind(user_id)
    .bind(ds_meta_data_id)
    .bind(command.anonymous)
    .bind(created_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        map_foreign_key_violation(e, CreateDataSetError::UnknownUser(user.id), CreateDataSetError::Database)
    })?
    .last_insert_rowid();

    let mut feature_models = Vec::with_capacity(command.feature_models.len());
    for submission in &command.feature_models {
        let created =
            create_feature_model(conn, user, dataset_id, command.anonymous, submission).await?;
        feature_models.push(created);
    }

    Ok(CreateDataSetResponse {
        id: dataset_id,
        ds_meta_data_id,
        title: command.title.trim().to_string(),
        is_anonymous: command.anonymous,
        created_at,
        feature_models,
    })
}

async fn create_feature_model(
    conn: &mut SqliteConnection,
    user: &ActingUser,
    dataset_id: i64,
    anonymous: bool,
    submission: &FeatureModelSubmission,
) -> Result<CreatedFeatureModel, CreateDataSetError> {
    let uvl_filename = submission.uvl_filename.trim();

    let fm_meta_data_id = sqlx::query(
        "INSERT INTO fm_meta_data (uvl_filename, title, description, publication_type, publication_doi, tags, uvl_version)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(uvl_filename)
    .bind(submission.title.trim())
    .bind(&submission.description)
    .bind(submission.publication_type.as_str())
    .bind(non_empty(&submission.publication_doi))
    .bind(non_empty(&submission.tags))
    .bind(non_empty(&submission.uvl_version))
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    if !anonymous {
        insert_authors(conn, AuthorOwner::FeatureModel(fm_meta_data_id), &submission.authors, 0)
            .await?;
    }

    let feature_model_id =
        sqlx::query("INSERT INTO feature_models (data_set_id, fm_meta_data_id) VALUES (?, ?)")
            .bind(dataset_id)
            .bind(fm_meta_data_id)
            .execute(&mut *conn)
            .await?
            .last_insert_rowid();

    let FileDigest { checksum, size } = digest_upload(user.temp_folder.join(uvl_filename)).await?;

    let hubfile_id = sqlx::query(
        "INSERT INTO hubfiles (name, checksum, size, feature_model_id) VALUES (?, ?, ?, ?)",
    )
    .bind(uvl_filename)
    .bind(&checksum)
    .bind(stored_size(uvl_filename, size)?)
    .bind(feature_model_id)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    tracing::debug!(feature_model_id, hubfile_id, %checksum, size, "Feature model stored");

    Ok(CreatedFeatureModel {
        id: feature_model_id,
        uvl_filename: uvl_filename.to_string(),
        hubfile_id,
        checksum,
        size,
        size_human: human_readable_size(size),
    })
}

async fn digest_upload(path: PathBuf) -> Result<FileDigest, CreateDataSetError> {
    tokio::task::spawn_blocking(move || calculate_checksum_and_size(&path))
        .await
        .map_err(|e| CreateDataSetError::Upload(HubError::Io(std::io::Error::other(e))))?
        .map_err(CreateDataSetError::from)
}

/// Byte size as stored in the `hubfiles.size` INTEGER column
fn stored_size(filename: &str, size: u64) -> Result<i64, CreateDataSetError> {
    i64::try_from(size).map_err(|_| CreateDataSetError::FileTooLarge {
        filename: filename.to_string(),
        size,
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::{stage_upload, test_pool, test_storage, TestUser};

    fn command(files: &[&str]) -> CreateDataSetCommand {
        CreateDataSetCommand {
            title: "Automotive product lines".to_string(),
            description: "Car configurator models".to_string(),
            publication_type: PublicationType::JournalArticle,
            authors: vec![NewAuthor {
                name: "Turing, Alan".to_string(),
                affiliation: None,
                orcid: None,
            }],
            feature_models: files.iter().map(|f| FeatureModelSubmission::new(*f)).collect(),
            ..Default::default()
        }
    }

    async fn count(pool: &SqlitePool, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[test]
    fn test_validate_rejects_bad_forms() {
        assert!(matches!(
            command(&[]).validate(),
            Err(CreateDataSetError::NoFeatureModels)
        ));
        assert!(matches!(
            command(&["a.uvl", "a.uvl"]).validate(),
            Err(CreateDataSetError::DuplicateFilename(_))
        ));
        assert!(matches!(
            command(&["../a.uvl"]).validate(),
            Err(CreateDataSetError::Filename(_))
        ));

        let mut untitled = command(&["a.uvl"]);
        untitled.title = " ".to_string();
        assert!(matches!(untitled.validate(), Err(CreateDataSetError::Text(_))));
    }

    #[test]
    fn test_stored_size_rejects_sizes_beyond_integer_column() {
        assert_eq!(stored_size("car.uvl", 11).unwrap(), 11);
        assert_eq!(stored_size("car.uvl", i64::MAX as u64).unwrap(), i64::MAX);

        let err = stored_size("car.uvl", u64::MAX).unwrap_err();
        assert!(matches!(
            err,
            CreateDataSetError::FileTooLarge { ref filename, size } if filename == "car.uvl" && size == u64::MAX
        ));
    }

    #[tokio::test]
    async fn test_creates_aggregate_with_checksums() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool().await;
        let storage = test_storage(dir.path());
        let user = TestUser::new("ada@example.org").insert(&pool, &storage).await.unwrap();
        stage_upload(&user, "car.uvl", b"hello world");
        stage_upload(&user, "bike.uvl", b"");

        let response = handle(&pool, &user, command(&["car.uvl", "bike.uvl"])).await.unwrap();

        assert_eq!(response.feature_models.len(), 2);
        assert_eq!(response.feature_models[0].checksum, "5eb63bbbe01eeed093cb22bb8f5acdc3");
        assert_eq!(response.feature_models[0].size, 11);
        assert_eq!(response.feature_models[0].size_human, "11 bytes");
        assert_eq!(count(&pool, "data_sets").await, 1);
        assert_eq!(count(&pool, "ds_meta_data").await, 1);
        assert_eq!(count(&pool, "hubfiles").await, 2);
        // uploader first, then the declared co-author
        let names: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM authors WHERE ds_meta_data_id = ? ORDER BY position",
        )
        .bind(response.ds_meta_data_id)
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(names, vec!["Lovelace, Ada", "Turing, Alan"]);

        // files stay in the temp folder until relocation
        assert!(user.temp_folder.join("car.uvl").exists());
    }

    #[tokio::test]
    async fn test_anonymous_dataset_has_no_user_or_authors() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool().await;
        let storage = test_storage(dir.path());
        let user = TestUser::new("ada@example.org").insert(&pool, &storage).await.unwrap();
        stage_upload(&user, "car.uvl", b"features");

        let mut cmd = command(&["car.uvl"]);
        cmd.anonymous = true;
        cmd.feature_models[0].authors = cmd.authors.clone();
        let response = handle(&pool, &user, cmd).await.unwrap();

        let (user_id, owner_id): (Option<i64>, i64) =
            sqlx::query_as("SELECT user_id, owner_id FROM data_sets WHERE id = ?")
                .bind(response.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(user_id, None);
        assert_eq!(owner_id, user.id);
        assert_eq!(count(&pool, "authors").await, 0);
    }

    #[tokio::test]
    async fn test_missing_upload_rolls_everything_back() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool().await;
        let storage = test_storage(dir.path());
        let user = TestUser::new("ada@example.org").insert(&pool, &storage).await.unwrap();
        stage_upload(&user, "car.uvl", b"features");

        let err = handle(&pool, &user, command(&["car.uvl", "missing.uvl"])).await.unwrap_err();
        assert!(matches!(err, CreateDataSetError::UploadMissing(_)));

        for table in ["data_sets", "ds_meta_data", "fm_meta_data", "feature_models", "hubfiles", "authors"] {
            assert_eq!(count(&pool, table).await, 0, "{table} should be empty");
        }
    }

    #[tokio::test]
    async fn test_unknown_user_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool().await;
        let storage = test_storage(dir.path());
        let mut ghost = TestUser::new("ada@example.org").insert(&pool, &storage).await.unwrap();
        ghost.id = 999;
        ghost.temp_folder = storage.temp_folder(999);
        stage_upload(&ghost, "car.uvl", b"features");

        let err = handle(&pool, &ghost, command(&["car.uvl"])).await.unwrap_err();
        assert!(matches!(err, CreateDataSetError::UnknownUser(999)));
        assert_eq!(count(&pool, "ds_meta_data").await, 0);
    }
}
