//! Feature slices of the hub API
//!
//! Each slice keeps its writes in `commands/`, its reads in `queries/` and
//! its HTTP wiring in `routes.rs`; small slices keep all three in one file.
//!
//! - **datasets**: creation, anonymity, likes, metadata, sync state, export
//! - **records**: view and download logs
//! - **users**: acting-user resolution and profile listings
//! - **doi_mappings**: old-to-new DOI lookups
//! - **authors**: author rows shared by the dataset commands

pub mod authors;
pub mod datasets;
pub mod doi_mappings;
pub mod records;
pub mod shared;
pub mod users;

use axum::Router;
use sqlx::SqlitePool;

use crate::storage::Storage;

/// State shared by every feature route
#[derive(Clone)]
pub struct FeatureState {
    pub db: SqlitePool,
    pub storage: Storage,
    /// Public host name used in DOI links
    pub domain: String,
}

/// Routes mounted under `/api/v1`
pub fn router() -> Router<FeatureState> {
    Router::new()
        .nest(
            "/datasets",
            datasets::datasets_routes().merge(records::records_routes()),
        )
        .nest("/users", users::users_routes())
        .nest("/doi-mappings", doi_mappings::doi_mapping_routes())
}
