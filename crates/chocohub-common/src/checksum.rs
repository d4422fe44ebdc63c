//! Checksum utilities for uploaded files
//!
//! Hubfile checksums are MD5 hex digests computed over the whole file, which
//! is read into memory in one go. Uploads are UVL feature models, so files
//! stay small.

use crate::error::{HubError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Checksum and byte size of a file on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDigest {
    pub checksum: String,
    pub size: u64,
}

/// MD5 hex digest of a byte slice
pub fn compute_checksum(data: &[u8]) -> String {
    format!("{:x}", md5::compute(data))
}

/// Read a previously uploaded file and return its MD5 checksum and size
pub fn calculate_checksum_and_size(path: impl AsRef<Path>) -> Result<FileDigest> {
    let path = path.as_ref();
    let content = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => HubError::FileNotFound(path.to_path_buf()),
        _ => HubError::Io(e),
    })?;

    Ok(FileDigest {
        checksum: compute_checksum(&content),
        size: content.len() as u64,
    })
}
