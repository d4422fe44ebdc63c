pub mod doi;
pub mod export;
pub mod stats;
pub mod synchronized;

pub use export::{generate_datasets_and_name_zip, DatasetArchive, ExportError};
pub use stats::HubStats;
pub use synchronized::{get_synchronized_datasets, SynchronizedDataset, SynchronizedError};
