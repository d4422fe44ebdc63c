//! View and download records
//!
//! Both logs are append-only and deduplicated per browser cookie: a second
//! visit carrying the same cookie for the same dataset adds nothing.

pub mod routes;

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::features::shared::cookies::{DOWNLOAD_COOKIE, VIEW_COOKIE};
use crate::features::shared::error_helpers::map_foreign_key_violation;

pub use routes::records_routes;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    View,
    Download,
}

impl RecordKind {
    /// Name of the cookie that identifies the browser for this kind
    pub fn cookie_name(self) -> &'static str {
        match self {
            RecordKind::View => VIEW_COOKIE,
            RecordKind::Download => DOWNLOAD_COOKIE,
        }
    }

    fn table(self) -> &'static str {
        match self {
            RecordKind::View => "ds_view_records",
            RecordKind::Download => "ds_download_records",
        }
    }

    fn date_column(self) -> &'static str {
        match self {
            RecordKind::View => "view_date",
            RecordKind::Download => "download_date",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Dataset {0} not found")]
    DatasetNotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Outcome of a record call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    /// Cookie to hand back to the browser
    pub cookie: String,
    /// Whether a new row was written
    pub created: bool,
}

/// Record a view or download unless this cookie already has one
///
/// A missing cookie is replaced by a fresh random UUID, which is returned so
/// the caller can set it on the response.
#[tracing::instrument(skip(pool, cookie))]
pub async fn record(
    pool: &SqlitePool,
    kind: RecordKind,
    dataset_id: i64,
    user_id: Option<i64>,
    cookie: Option<String>,
) -> Result<Recorded, RecordError> {
    let cookie = cookie.unwrap_or_else(|| Uuid::new_v4().to_string());
    let table = kind.table();
    let cookie_column = kind.cookie_name();

    let exists: bool = sqlx::query_scalar(&format!(
        "SELECT EXISTS (SELECT 1 FROM {table} WHERE dataset_id = ? AND {cookie_column} = ?)"
    ))
    .bind(dataset_id)
    .bind(&cookie)
    .fetch_one(pool)
    .await?;

    if exists {
        return Ok(Recorded { cookie, created: false });
    }

    sqlx::query(&format!(
        "INSERT INTO {table} (user_id, dataset_id, {date}, {cookie_column}) VALUES (?, ?, ?, ?)",
        date = kind.date_column(),
    ))
    .bind(user_id)
    .bind(dataset_id)
    .bind(Utc::now())
    .bind(&cookie)
    .execute(pool)
    .await
    .map_err(|e| {
        map_foreign_key_violation(e, RecordError::DatasetNotFound(dataset_id), RecordError::Database)
    })?;

    tracing::debug!("Record stored");
    Ok(Recorded { cookie, created: true })
}

pub async fn register_view(
    pool: &SqlitePool,
    dataset_id: i64,
    user_id: Option<i64>,
    cookie: Option<String>,
) -> Result<Recorded, RecordError> {
    record(pool, RecordKind::View, dataset_id, user_id, cookie).await
}

pub async fn record_download(
    pool: &SqlitePool,
    dataset_id: i64,
    user_id: Option<i64>,
    cookie: Option<String>,
) -> Result<Recorded, RecordError> {
    record(pool, RecordKind::Download, dataset_id, user_id, cookie).await
}

/// Number of records of `kind` for one dataset
pub async fn count_for_dataset(
    pool: &SqlitePool,
    kind: RecordKind,
    dataset_id: i64,
) -> sqlx::Result<i64> {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {} WHERE dataset_id = ?", kind.table()))
        .bind(dataset_id)
        .fetch_one(pool)
        .await
}

pub async fn total_dataset_views(pool: &SqlitePool) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM ds_view_records")
        .fetch_one(pool)
        .await
}

pub async fn total_dataset_downloads(pool: &SqlitePool) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM ds_download_records")
        .fetch_one(pool)
        .await
}
