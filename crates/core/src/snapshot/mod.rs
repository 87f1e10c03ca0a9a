//! Snapshot module - portable export, validated import and bulk clear.

mod snapshot_model;
mod snapshot_service;
mod snapshot_traits;
mod snapshot_validation;


pub use snapshot_model::{
    snapshot_file_name, ClearSummary, ImportSummary, SnapshotDocument, TotalCount,
};
pub use snapshot_service::SnapshotService;
pub use snapshot_traits::SnapshotServiceTrait;
pub use snapshot_validation::{parse_snapshot, validate_snapshot};
