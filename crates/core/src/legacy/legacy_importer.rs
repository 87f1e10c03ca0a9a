//! One-shot transfer of the pre-versioned flat document into the asset store.

use std::sync::Arc;

use log::{debug, error, info, warn};
use serde::Serialize;

use super::legacy_model::{LegacyHolding, LegacyState};
use super::legacy_traits::LegacyStorageTrait;
use crate::assets::{Asset, AssetRepositoryTrait};
use crate::constants::LEGACY_STORAGE_KEY;
use crate::errors::{Error, Result};

/// Outcome of a legacy import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyImportReport {
    /// A legacy document was present.
    pub found: bool,
    pub assets_imported: usize,
    /// Entries that were already present, unparseable, or failed to insert.
    pub assets_skipped: usize,
    /// Holdings recognised but not carried into the current schema.
    pub holdings_discarded: usize,
    /// The run finished and the legacy document was removed.
    pub completed: bool,
}

pub struct LegacyImporter {
    storage: Arc<dyn LegacyStorageTrait>,
    repository: Arc<dyn AssetRepositoryTrait>,
}

impl LegacyImporter {
    pub fn new(
        storage: Arc<dyn LegacyStorageTrait>,
        repository: Arc<dyn AssetRepositoryTrait>,
    ) -> Self {
        Self {
            storage,
            repository,
        }
    }

    /// Runs the import. Never fails: problems are logged and reported, and the
    /// legacy document is kept so a later boot can retry.
    pub async fn run(&self) -> LegacyImportReport {
        match self.try_run().await {
            Ok(report) => report,
            Err(e) => {
                error!("Legacy data migration failed: {}", e);
                LegacyImportReport {
                    found: true,
                    ..Default::default()
                }
            }
        }
    }

    async fn try_run(&self) -> Result<LegacyImportReport> {
        let raw = match self.storage.get_item(LEGACY_STORAGE_KEY)? {
            Some(raw) => raw,
            None => return Ok(LegacyImportReport::default()),
        };

        let document: serde_json::Value = serde_json::from_str(&raw)
            .map_err(|e| Error::MalformedDocument(format!("legacy document: {}", e)))?;
        let state = LegacyState::from_document(document)
            .map_err(|e| Error::MalformedDocument(format!("legacy document: {}", e)))?;

        let mut report = LegacyImportReport {
            found: true,
            ..Default::default()
        };

        for entry in state.asset_entries() {
            let asset: Asset = match serde_json::from_value(entry.clone()) {
                Ok(asset) => asset,
                Err(e) => {
                    warn!("Skipping unreadable legacy asset: {}", e);
                    report.assets_skipped += 1;
                    continue;
                }
            };
            let asset_id = asset.id.clone();
            match self.repository.add(asset).await {
                Ok(()) => report.assets_imported += 1,
                Err(e) if e.is_duplicate_key() => {
                    debug!("Legacy asset {} already migrated", asset_id);
                    report.assets_skipped += 1;
                }
                Err(e) => {
                    warn!("Failed to migrate asset {}: {}", asset_id, e);
                    report.assets_skipped += 1;
                }
            }
        }

        for entry in state.holding_entries() {
            match serde_json::from_value::<LegacyHolding>(entry.clone()) {
                Ok(holding) => debug!(
                    "Discarding legacy holding {} of asset {}",
                    holding.id, holding.asset_id
                ),
                Err(e) => debug!("Discarding unreadable legacy holding: {}", e),
            }
            report.holdings_discarded += 1;
        }
        if report.holdings_discarded > 0 {
            warn!(
                "{} legacy holdings were not carried into the current schema",
                report.holdings_discarded
            );
        }

        self.storage.remove_item(LEGACY_STORAGE_KEY)?;
        report.completed = true;
        info!(
            "Legacy data migration completed: {} imported, {} skipped",
            report.assets_imported, report.assets_skipped
        );
        Ok(report)
    }
}
