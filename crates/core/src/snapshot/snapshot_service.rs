use std::sync::Arc;

use log::{debug, info, warn};

use super::snapshot_model::{ClearSummary, ImportSummary, SnapshotDocument};
use super::snapshot_traits::SnapshotServiceTrait;
use super::snapshot_validation::parse_snapshot;
use crate::assets::{AssetRepositoryTrait, HoldingRepositoryTrait};
use crate::errors::Result;

/// Whole-store export, validated merge import and bulk clear.
pub struct SnapshotService {
    asset_repository: Arc<dyn AssetRepositoryTrait>,
    holding_repository: Arc<dyn HoldingRepositoryTrait>,
}

impl SnapshotService {
    pub fn new(
        asset_repository: Arc<dyn AssetRepositoryTrait>,
        holding_repository: Arc<dyn HoldingRepositoryTrait>,
    ) -> Self {
        Self {
            asset_repository,
            holding_repository,
        }
    }
}

#[async_trait::async_trait]
impl SnapshotServiceTrait for SnapshotService {
    fn export_snapshot(&self) -> Result<SnapshotDocument> {
        let assets = self.asset_repository.list()?;
        let holdings = self.holding_repository.list_holdings()?;
        debug!(
            "Exporting snapshot with {} assets and {} holdings",
            assets.len(),
            holdings.len()
        );
        Ok(SnapshotDocument::new(assets, holdings))
    }

    fn export_snapshot_json(&self) -> Result<String> {
        let document = self.export_snapshot()?;
        Ok(serde_json::to_string_pretty(&document)?)
    }

    fn parse_snapshot(&self, text: &str) -> Result<SnapshotDocument> {
        parse_snapshot(text)
    }

    async fn merge_import(&self, document: SnapshotDocument) -> Result<ImportSummary> {
        let mut summary = ImportSummary::default();

        for asset in document.assets {
            let asset_id = asset.id.clone();
            if self.asset_repository.add(asset.clone()).await.is_ok() {
                summary.assets += 1;
                continue;
            }
            match self.asset_repository.put(asset).await {
                Ok(()) => summary.assets += 1,
                Err(e) => {
                    warn!("Skipping asset {} during import: {}", asset_id, e);
                    summary.assets_failed += 1;
                }
            }
        }

        for holding in document.holdings {
            let holding_id = holding.id.clone();
            if self.holding_repository.add_holding(holding.clone()).await.is_ok() {
                summary.holdings += 1;
                continue;
            }
            match self.holding_repository.put_holding(holding).await {
                Ok(()) => summary.holdings += 1,
                Err(e) => {
                    warn!("Skipping holding {} during import: {}", holding_id, e);
                    summary.holdings_failed += 1;
                }
            }
        }

        info!(
            "Snapshot import finished: {} assets, {} holdings ({} assets and {} holdings skipped)",
            summary.assets, summary.holdings, summary.assets_failed, summary.holdings_failed
        );
        Ok(summary)
    }

    async fn clear_all(&self) -> Result<ClearSummary> {
        let mut summary = ClearSummary::default();

        for holding in self.holding_repository.list_holdings()? {
            self.holding_repository.delete_holding(&holding.id).await?;
            summary.holdings += 1;
        }
        for asset in self.asset_repository.list()? {
            self.asset_repository.delete(&asset.id).await?;
            summary.assets += 1;
        }

        info!(
            "Cleared {} assets and {} holdings",
            summary.assets, summary.holdings
        );
        Ok(summary)
    }
}
