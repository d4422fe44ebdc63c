pub mod create;
pub mod like;
pub mod relocate;
pub mod toggle_anonymity;
pub mod update_metadata;

pub use create::{
    CreateDataSetCommand, CreateDataSetError, CreateDataSetResponse, CreatedFeatureModel,
    FeatureModelSubmission,
};
pub use like::{LikeDatasetCommand, LikeDatasetError, LikeDatasetResponse};
pub use relocate::relocate_feature_models;
pub use toggle_anonymity::{ToggleAnonymityCommand, ToggleAnonymityError, ToggleAnonymityResponse};
pub use update_metadata::{UpdateDsMetaDataCommand, UpdateDsMetaDataError};
