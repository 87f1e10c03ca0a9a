use super::snapshot_model::{ClearSummary, ImportSummary, SnapshotDocument};
use crate::errors::Result;

#[async_trait::async_trait]
pub trait SnapshotServiceTrait: Send + Sync {
    /// Reads every collection into a fresh snapshot envelope.
    fn export_snapshot(&self) -> Result<SnapshotDocument>;
    fn export_snapshot_json(&self) -> Result<String>;
    /// Parses and validates external text. Nothing is written.
    fn parse_snapshot(&self, text: &str) -> Result<SnapshotDocument>;
    /// Inserts each record, falling back to an upsert when the insert fails.
    /// Records that fail both ways are skipped and counted.
    async fn merge_import(&self, document: SnapshotDocument) -> Result<ImportSummary>;
    /// Deletes all holdings, then all assets.
    async fn clear_all(&self) -> Result<ClearSummary>;
}
