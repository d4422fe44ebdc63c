//! Dataset lifecycle: creation, anonymity, likes, synchronization and export

pub mod commands;
pub mod queries;
pub mod routes;

pub use commands::{
    CreateDataSetCommand, CreateDataSetError, CreateDataSetResponse, FeatureModelSubmission,
    LikeDatasetCommand, LikeDatasetError, ToggleAnonymityCommand, ToggleAnonymityError,
};
pub use queries::{generate_datasets_and_name_zip, get_synchronized_datasets, SynchronizedDataset};
pub use routes::{datasets_routes, like_routes};
