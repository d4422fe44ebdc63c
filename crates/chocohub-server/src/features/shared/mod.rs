//! Shared utilities and types for feature modules
//!
//! - **auth**: explicit acting-user extraction from request headers
//! - **cookies**: reading and setting the browser cookies the hub uses
//! - **pagination**: common pagination types and helpers
//! - **validation**: input validation utilities
//! - **error_helpers**: database constraint error helpers
//! - **test_helpers**: in-memory database fixtures (test-only)

pub mod auth;
pub mod cookies;
pub mod error_helpers;
pub mod pagination;
pub mod validation;

#[cfg(test)]
pub mod test_helpers;

pub use auth::{ActingUserId, USER_ID_HEADER};
pub use pagination::{Paginated, PaginationMetadata, PaginationParams};
