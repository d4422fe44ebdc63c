//! Database constraint error helpers
//!
//! ```rust,ignore
//! sqlx::query("INSERT INTO dataset_reviews ...")
//!     .execute(&pool)
//!     .await
//!     .map_err(|e| map_foreign_key_violation(e, LikeDatasetError::DatasetNotFound(id), LikeDatasetError::Database))?;
//! ```

use sqlx::Error as SqlxError;

pub fn is_foreign_key_violation(error: &SqlxError) -> bool {
    matches!(error, SqlxError::Database(db_err) if db_err.is_foreign_key_violation())
}

/// Return `fk_error` on a foreign key violation, otherwise wrap the error
pub fn map_foreign_key_violation<E, F>(error: SqlxError, fk_error: E, default_wrapper: F) -> E
where
    F: FnOnce(SqlxError) -> E,
{
    if is_foreign_key_violation(&error) {
        fk_error
    } else {
        default_wrapper(error)
    }
}
