pub mod record;
pub mod loader;

pub use record::{GroupKey, MovementKind, MovementRecord};
pub use loader::{load_records, load_records_from_path, write_records, DATASET_COLUMNS};
