//! ChocoHub server library
//!
//! HTTP service for hosting and sharing feature-model datasets.
//!
//! # Overview
//!
//! - **Datasets**: create a dataset from staged uploads in one transaction,
//!   then move the files into `uploads/user_<id>/dataset_<id>/`
//! - **Anonymity**: owners can hide or restore their attribution
//! - **Synchronization**: committed datasets with an on-disk directory, and a
//!   zip export of all of them
//! - **Records**: cookie-deduplicated view and download logs, likes
//!
//! # Architecture
//!
//! Features are vertical slices under [`features`], each with commands
//! (writes), queries (reads) and routes. Every operation receives the acting
//! user explicitly; nothing reads the current user from ambient state.
//!
//! ## Framework Stack
//!
//! - **Axum**: HTTP routing and extractors
//! - **SQLx**: SQLite access with embedded migrations
//! - **Tower**: Middleware (CORS, request tracing)
//!
//! # Example
//!
//! ```no_run
//! use chocohub_server::{api, config::Config, db, features::FeatureState, storage::Storage};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let pool = db::create_pool(&config.database).await?;
//!     db::run_migrations(&pool).await?;
//!     let state = FeatureState {
//!         db: pool,
//!         storage: Storage::new(config.storage.clone()),
//!         domain: config.server.domain.clone(),
//!     };
//!     let app = api::create_router(state, &config.cors);
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod middleware;
pub mod models;
pub mod storage;

pub use config::Config;
pub use error::{AppError, AppResult};
