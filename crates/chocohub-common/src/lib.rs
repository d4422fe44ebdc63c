//! ChocoHub Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the ChocoHub workspace.
//!
//! - **Error Handling**: [`HubError`] and the [`Result`] alias
//! - **Checksums**: content hashing for uploaded feature-model files
//! - **Logging**: tracing subscriber setup shared by every binary
//! - **Types**: publication types and size formatting
//!
//! # Example
//!
//! ```no_run
//! use chocohub_common::checksum::calculate_checksum_and_size;
//!
//! fn describe(path: &str) -> chocohub_common::Result<()> {
//!     let digest = calculate_checksum_and_size(path)?;
//!     tracing::info!(checksum = %digest.checksum, size = digest.size, "Digested upload");
//!     Ok(())
//! }
//! ```

pub mod checksum;
pub mod error;
pub mod logging;
pub mod types;

pub use error::{HubError, Result};
