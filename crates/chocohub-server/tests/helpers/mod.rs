//! Shared setup for ChocoHub server integration tests
//!
//! Every test gets its own in-memory database and working directory.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use chocohub_server::{
    api,
    config::CorsConfig,
    db,
    features::FeatureState,
    models::{ActingUser, UserProfile},
    storage::{config::StorageConfig, Storage},
};
use serde_json::Value;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

pub const TEST_DOMAIN: &str = "hub.test";

pub struct TestHub {
    pub pool: SqlitePool,
    pub storage: Storage,
    pub dir: TempDir,
}

impl TestHub {
    pub async fn new() -> Self {
        let pool = db::create_memory_pool().await.expect("memory pool");
        db::run_migrations(&pool).await.expect("migrations");
        let dir = tempfile::tempdir().expect("working dir");
        let storage = Storage::new(StorageConfig::at(dir.path()));
        Self { pool, storage, dir }
    }

    pub fn app(&self) -> Router {
        let state = FeatureState {
            db: self.pool.clone(),
            storage: self.storage.clone(),
            domain: TEST_DOMAIN.to_string(),
        };
        let cors = CorsConfig {
            allowed_origins: vec![],
            allow_credentials: false,
        };
        api::create_router(state, &cors)
    }

    /// Insert a user with a profile and return it as an acting user
    pub async fn user(&self, email: &str, name: &str, surname: &str) -> ActingUser {
        let id = sqlx::query("INSERT INTO users (email) VALUES (?)")
            .bind(email)
            .execute(&self.pool)
            .await
            .expect("insert user")
            .last_insert_rowid();

        sqlx::query("INSERT INTO user_profiles (user_id, name, surname, affiliation) VALUES (?, ?, ?, ?)")
            .bind(id)
            .bind(name)
            .bind(surname)
            .bind("University of Seville")
            .execute(&self.pool)
            .await
            .expect("insert profile");

        ActingUser {
            id,
            profile: UserProfile {
                name: name.to_string(),
                surname: surname.to_string(),
                affiliation: Some("University of Seville".to_string()),
                orcid: None,
            },
            temp_folder: self.storage.temp_folder(id),
        }
    }

    pub fn stage(&self, user: &ActingUser, name: &str, contents: &str) {
        std::fs::create_dir_all(&user.temp_folder).expect("temp folder");
        std::fs::write(user.temp_folder.join(name), contents).expect("staged file");
    }

    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.pool)
            .await
            .expect("count")
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app().oneshot(request).await.expect("response")
    }
}

pub fn json_request(method: &str, uri: &str, user_id: Option<i64>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(id) = user_id {
        builder = builder.header("x-user-id", id.to_string());
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}
