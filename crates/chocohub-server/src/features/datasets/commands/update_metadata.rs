//! Update dataset metadata
//!
//! Only the dataset owner may edit. Omitted fields keep their value; an
//! empty DOI or tag string clears the column.

use chocohub_common::types::PublicationType;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::create::MAX_TITLE_LENGTH;
use crate::features::shared::validation::{
    validate_doi, validate_text, DoiValidationError, TextValidationError,
};
use crate::models::{DataSetRecord, DsMetaDataRecord};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDsMetaDataCommand {
    #[serde(skip)]
    pub dataset_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_type: Option<PublicationType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateDsMetaDataError {
    #[error("No fields to update")]
    NoFieldsToUpdate,

    #[error("{0}")]
    Text(#[from] TextValidationError),

    #[error("{0}")]
    Doi(#[from] DoiValidationError),

    #[error("Dataset {0} not found")]
    NotFound(i64),

    #[error("User {user_id} does not own dataset {dataset_id}")]
    PermissionDenied { dataset_id: i64, user_id: i64 },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl UpdateDsMetaDataCommand {
    pub fn validate(&self) -> Result<(), UpdateDsMetaDataError> {
        if self.title.is_none()
            && self.description.is_none()
            && self.publication_type.is_none()
            && self.publication_doi.is_none()
            && self.dataset_doi.is_none()
            && self.tags.is_none()
        {
            return Err(UpdateDsMetaDataError::NoFieldsToUpdate);
        }

        if let Some(title) = &self.title {
            validate_text(title, "title", MAX_TITLE_LENGTH)?;
        }
        if let Some(description) = &self.description {
            validate_text(description, "description", usize::MAX)?;
        }
        validate_doi(self.publication_doi.as_deref(), "publication_doi")?;
        validate_doi(self.dataset_doi.as_deref(), "dataset_doi")?;

        Ok(())
    }
}

/// `None` keeps the column; `Some("")` becomes NULL
fn optional_column(value: &Option<String>) -> (bool, Option<&str>) {
    match value.as_deref().map(str::trim) {
        None => (false, None),
        Some("") => (true, None),
        Some(v) => (true, Some(v)),
    }
}

#[tracing::instrument(skip(pool, command), fields(dataset_id = command.dataset_id))]
pub async fn handle(
    pool: &SqlitePool,
    user_id: i64,
    command: UpdateDsMetaDataCommand,
) -> Result<DsMetaDataRecord, UpdateDsMetaDataError> {
    command.validate()?;

    let mut tx = pool.begin().await?;

    let dataset = sqlx::query_as::<_, DataSetRecord>(
        "SELECT id, owner_id, user_id, ds_meta_data_id, is_anonymous, created_at
         FROM data_sets WHERE id = ?",
    )
    .bind(command.dataset_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(UpdateDsMetaDataError::NotFound(command.dataset_id))?;

    if !dataset.is_owned_by(user_id) {
        return Err(UpdateDsMetaDataError::PermissionDenied {
            dataset_id: dataset.id,
            user_id,
        });
    }

    let (set_pub_doi, publication_doi) = optional_column(&command.publication_doi);
    let (set_ds_doi, dataset_doi) = optional_column(&command.dataset_doi);
    let (set_tags, tags) = optional_column(&command.tags);

    let record = sqlx::query_as::<_, DsMetaDataRecord>(
        r#"
        UPDATE ds_meta_data SET
            title = COALESCE(?, title),
            description = COALESCE(?, description),
            publication_type = COALESCE(?, publication_type),
            publication_doi = CASE WHEN ? THEN ? ELSE publication_doi END,
            dataset_doi = CASE WHEN ? THEN ? ELSE dataset_doi END,
            tags = CASE WHEN ? THEN ? ELSE tags END
        WHERE id = ?
        RETURNING id, title, description, publication_type, publication_doi, dataset_doi, tags
        "#,
    )
    .bind(command.title.as_deref().map(str::trim))
    .bind(command.description.as_deref())
    .bind(command.publication_type.map(|t| t.as_str()))
    .bind(set_pub_doi)
    .bind(publication_doi)
    .bind(set_ds_doi)
    .bind(dataset_doi)
    .bind(set_tags)
    .bind(tags)
    .bind(dataset.ds_meta_data_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(ds_meta_data_id = record.id, "Dataset metadata updated");
    Ok(record)
}
