//! DOI lookups on dataset metadata

use sqlx::SqlitePool;

use crate::models::DataSetSummary;

/// Public landing URL for a DOI: `http://<domain>/doi/<doi>`
pub fn doi_url(domain: &str, dataset_doi: &str) -> String {
    format!("http://{domain}/doi/{dataset_doi}")
}

/// DOI URL of a dataset, `None` when it has no DOI yet
pub async fn get_doi_url(
    pool: &SqlitePool,
    domain: &str,
    dataset_id: i64,
) -> sqlx::Result<Option<Option<String>>> {
    let doi: Option<Option<String>> = sqlx::query_scalar(
        "SELECT m.dataset_doi FROM data_sets ds JOIN ds_meta_data m ON m.id = ds.ds_meta_data_id
         WHERE ds.id = ?",
    )
    .bind(dataset_id)
    .fetch_optional(pool)
    .await?;

    Ok(doi.map(|d| d.map(|d| doi_url(domain, &d))))
}

/// Dataset whose metadata carries exactly this DOI
pub async fn filter_by_doi(pool: &SqlitePool, doi: &str) -> sqlx::Result<Option<DataSetSummary>> {
    sqlx::query_as(
        "SELECT ds.id, ds.user_id, ds.is_anonymous, ds.created_at, m.title, m.dataset_doi
         FROM data_sets ds JOIN ds_meta_data m ON m.id = ds.ds_meta_data_id
         WHERE m.dataset_doi = ?",
    )
    .bind(doi)
    .fetch_optional(pool)
    .await
}
