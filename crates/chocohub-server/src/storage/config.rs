use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf};

/// Default base directory for the `uploads/` tree.
pub const DEFAULT_WORKING_DIR: &str = ".";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Base path under which `uploads/` lives
    pub working_dir: PathBuf,
}

impl StorageConfig {
    pub fn from_env() -> Self {
        Self {
            working_dir: env::var("WORKING_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKING_DIR)),
        }
    }

    pub fn at(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }
}
