//! Test fixtures for database-backed unit tests
//!
//! ```rust,ignore
//! let pool = test_pool().await;
//! let storage = test_storage(dir.path());
//! let user = TestUser::new("ada@example.org").insert(&pool, &storage).await?;
//! stage_upload(&user, "model.uvl", b"features\n    Root");
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};

use crate::db::{create_memory_pool, run_migrations};
use crate::models::{ActingUser, UserProfile};
use crate::storage::{config::StorageConfig, Storage};

/// Fresh in-memory database with every migration applied
pub async fn test_pool() -> SqlitePool {
    let pool = create_memory_pool().await.expect("memory pool");
    run_migrations(&pool).await.expect("migrations");
    pool
}

pub fn test_storage(dir: &Path) -> Storage {
    Storage::new(StorageConfig::at(dir))
}

/// Builder for a user row plus its profile
#[derive(Debug, Clone)]
pub struct TestUser {
    pub email: String,
    pub profile: UserProfile,
}

impl TestUser {
    pub fn new(email: &str) -> Self {
        Self {
            email: email.to_string(),
            profile: UserProfile {
                name: "Ada".to_string(),
                surname: "Lovelace".to_string(),
                affiliation: Some("University of Seville".to_string()),
                orcid: None,
            },
        }
    }

    pub fn with_name(mut self, name: &str, surname: &str) -> Self {
        self.profile.name = name.to_string();
        self.profile.surname = surname.to_string();
        self
    }

    pub fn with_orcid(mut self, orcid: &str) -> Self {
        self.profile.orcid = Some(orcid.to_string());
        self
    }

    pub async fn insert(self, pool: &SqlitePool, storage: &Storage) -> sqlx::Result<ActingUser> {
        let id = sqlx::query("INSERT INTO users (email) VALUES (?)")
            .bind(&self.email)
            .execute(pool)
            .await?
            .last_insert_rowid();

        sqlx::query(
            "INSERT INTO user_profiles (user_id, name, surname, affiliation, orcid)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(&self.profile.name)
        .bind(&self.profile.surname)
        .bind(&self.profile.affiliation)
        .bind(&self.profile.orcid)
        .execute(pool)
        .await?;

        Ok(ActingUser {
            id,
            profile: self.profile,
            temp_folder: storage.temp_folder(id),
        })
    }
}

/// Write a file into the user's temp folder, as an upload would
pub fn stage_upload(user: &ActingUser, name: &str, contents: &[u8]) -> PathBuf {
    std::fs::create_dir_all(&user.temp_folder).expect("temp folder");
    let path = user.temp_folder.join(name);
    std::fs::write(&path, contents).expect("staged upload");
    path
}

/// Insert a bare dataset (metadata + dataset row) without authors or files
pub async fn insert_dataset(
    pool: &SqlitePool,
    owner_id: i64,
    title: &str,
    is_anonymous: bool,
) -> sqlx::Result<i64> {
    let meta_id = sqlx::query(
        "INSERT INTO ds_meta_data (title, description, publication_type) VALUES (?, 'fixture', 'none')",
    )
    .bind(title)
    .execute(pool)
    .await?
    .last_insert_rowid();

    let user_id = (!is_anonymous).then_some(owner_id);
    let id = sqlx::query(
        "INSERT INTO data_sets (owner_id, user_id, ds_meta_data_id, is_anonymous, created_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(owner_id)
    .bind(user_id)
    .bind(meta_id)
    .bind(is_anonymous)
    .bind(Utc::now())
    .execute(pool)
    .await?
    .last_insert_rowid();

    Ok(id)
}
