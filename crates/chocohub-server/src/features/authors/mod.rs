//! Author rows for dataset and feature-model metadata
//!
//! These helpers take a `&mut SqliteConnection` so callers can run them
//! inside their own transaction.

use sqlx::{SqliteConnection, SqlitePool};

use crate::models::{AuthorRecord, NewAuthor};

/// Which metadata record an author list hangs off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorOwner {
    DataSet(i64),
    FeatureModel(i64),
}

impl AuthorOwner {
    fn columns(self) -> (Option<i64>, Option<i64>) {
        match self {
            AuthorOwner::DataSet(id) => (Some(id), None),
            AuthorOwner::FeatureModel(id) => (None, Some(id)),
        }
    }
}

/// Insert `authors` in order, numbering positions from `first_position`
pub async fn insert_authors(
    conn: &mut SqliteConnection,
    owner: AuthorOwner,
    authors: &[NewAuthor],
    first_position: i64,
) -> sqlx::Result<()> {
    let (ds_meta_data_id, fm_meta_data_id) = owner.columns();

    for (offset, author) in (0_i64..).zip(authors) {
        sqlx::query(
            "INSERT INTO authors (name, affiliation, orcid, position, ds_meta_data_id, fm_meta_data_id)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(author.name.trim())
        .bind(&author.affiliation)
        .bind(&author.orcid)
        .bind(first_position + offset)
        .bind(ds_meta_data_id)
        .bind(fm_meta_data_id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Delete every author of a dataset's metadata, returning how many went
pub async fn delete_dataset_authors(
    conn: &mut SqliteConnection,
    ds_meta_data_id: i64,
) -> sqlx::Result<u64> {
    let result = sqlx::query("DELETE FROM authors WHERE ds_meta_data_id = ?")
        .bind(ds_meta_data_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

pub async fn list_dataset_authors(
    conn: &mut SqliteConnection,
    ds_meta_data_id: i64,
) -> sqlx::Result<Vec<AuthorRecord>> {
    sqlx::query_as::<_, AuthorRecord>(
        "SELECT id, name, affiliation, orcid, position
         FROM authors WHERE ds_meta_data_id = ?
         ORDER BY position, id",
    )
    .bind(ds_meta_data_id)
    .fetch_all(&mut *conn)
    .await
}

pub async fn count_authors(pool: &SqlitePool) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM authors").fetch_one(pool).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::test_pool;

    fn author(name: &str) -> NewAuthor {
        NewAuthor {
            name: name.to_string(),
            affiliation: None,
            orcid: None,
        }
    }

    #[tokio::test]
    async fn test_insert_list_delete() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let meta_id = sqlx::query("INSERT INTO ds_meta_data (title, description) VALUES ('t', 'd')")
            .execute(&mut *conn)
            .await
            .unwrap()
            .last_insert_rowid();

        insert_authors(
            &mut conn,
            AuthorOwner::DataSet(meta_id),
            &[author("Lovelace, Ada"), author(" Turing, Alan ")],
            0,
        )
        .await
        .unwrap();

        let listed = list_dataset_authors(&mut conn, meta_id).await.unwrap();
        let names: Vec<_> = listed.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Lovelace, Ada", "Turing, Alan"]);
        assert_eq!(listed[1].position, 1);

        assert_eq!(delete_dataset_authors(&mut conn, meta_id).await.unwrap(), 2);
        drop(conn);
        assert_eq!(count_authors(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_feature_model_authors_are_separate() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let fm_id = sqlx::query(
            "INSERT INTO fm_meta_data (uvl_filename, title, description) VALUES ('a.uvl', 't', 'd')",
        )
        .execute(&mut *conn)
        .await
        .unwrap()
        .last_insert_rowid();

        insert_authors(&mut conn, AuthorOwner::FeatureModel(fm_id), &[author("Hopper, Grace")], 0)
            .await
            .unwrap();

        assert!(list_dataset_authors(&mut conn, fm_id).await.unwrap().is_empty());
    }
}
