//! In-memory mirror of the asset store and its derived total.
//!
//! The mirror is only ever replaced wholesale from the store (`reload_data`);
//! no operation patches it incrementally, so after any successful reload it is
//! exactly the store's content. Data volume is small, so the full reload after
//! every write is cheap enough.

use std::future::Future;
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{error, info, warn};
use rust_decimal::Decimal;
use tokio::sync::OnceCell;

use super::state_model::{calculate_total_value, AssetsState};
use crate::assets::{Asset, AssetRepositoryTrait, AssetUpdate, NewAsset};
use crate::errors::{Error, Result};
use crate::legacy::{LegacyImportReport, LegacyImporter, LegacyStorageTrait};

pub struct AppStore {
    repository: Arc<dyn AssetRepositoryTrait>,
    legacy_importer: LegacyImporter,
    state: RwLock<AssetsState>,
    /// Held across `list()` and the swap so overlapping reloads apply in store order.
    reload_guard: Mutex<()>,
    boot: OnceCell<LegacyImportReport>,
}

impl AppStore {
    pub fn new(
        repository: Arc<dyn AssetRepositoryTrait>,
        legacy_storage: Arc<dyn LegacyStorageTrait>,
    ) -> Self {
        Self {
            legacy_importer: LegacyImporter::new(legacy_storage, repository.clone()),
            repository,
            state: RwLock::new(AssetsState::default()),
            reload_guard: Mutex::new(()),
            boot: OnceCell::new(),
        }
    }

    /// Opens the store, runs the legacy import and loads the mirror.
    ///
    /// Concurrent callers wait on the same boot; once it has succeeded every
    /// further call returns immediately. A failed boot may be retried.
    pub async fn initialize_app(&self) -> Result<()> {
        self.boot.get_or_try_init(|| self.boot_sequence()).await?;
        Ok(())
    }

    /// Report of the legacy import performed during boot, if boot has completed.
    pub fn legacy_import_report(&self) -> Option<&LegacyImportReport> {
        self.boot.get()
    }

    async fn boot_sequence(&self) -> Result<LegacyImportReport> {
        self.write_state()?.loading = true;
        let result = self.open_and_load().await;
        self.write_state()?.loading = false;

        match result {
            Ok(report) => {
                self.write_state()?.initialized = true;
                Ok(report)
            }
            Err(e) => {
                error!("Failed to initialize app: {}", e);
                Err(e)
            }
        }
    }

    async fn open_and_load(&self) -> Result<LegacyImportReport> {
        let version = self.repository.open().await?;
        info!("Asset store opened at schema version {}", version);

        let report = self.legacy_importer.run().await;
        self.refresh_mirror();
        Ok(report)
    }

    /// Replaces the mirror with the store's current content and recomputes the total.
    pub fn reload_data(&self) -> Result<()> {
        let _reload = self
            .reload_guard
            .lock()
            .map_err(|e| Error::Unexpected(e.to_string()))?;
        let assets = self.repository.list().map_err(|e| {
            error!("Failed to reload data: {}", e);
            e
        })?;
        let mut state = self.write_state()?;
        state.total_asset_value = calculate_total_value(&assets);
        state.assets = assets;
        Ok(())
    }

    /// Runs a bulk store operation and reloads the mirror afterwards, also when
    /// the operation failed part-way. The operation's own result is returned.
    pub async fn reload_after<T, F>(&self, operation: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let result = operation.await;
        self.refresh_mirror();
        result
    }

    /// Re-derives the total from the current mirror without touching the store.
    pub fn calculate_total_value(&self) -> Result<Decimal> {
        let mut state = self.write_state()?;
        state.total_asset_value = calculate_total_value(&state.assets);
        Ok(state.total_asset_value)
    }

    pub async fn add_asset(&self, new_asset: NewAsset) -> Result<Asset> {
        new_asset.validate()?;
        let asset = new_asset.into_asset();

        self.repository.add(asset.clone()).await.map_err(|e| {
            error!("Failed to add asset: {}", e);
            e
        })?;
        self.refresh_mirror();
        Ok(asset)
    }

    pub async fn update_asset(&self, asset_id: &str, update: AssetUpdate) -> Result<Asset> {
        let existing = self.find_asset(asset_id)?;
        let updated = existing.apply_update(update);
        updated.validate()?;

        self.repository.put(updated.clone()).await.map_err(|e| {
            error!("Failed to update asset {}: {}", asset_id, e);
            e
        })?;
        self.refresh_mirror();
        Ok(updated)
    }

    pub async fn delete_asset(&self, asset_id: &str) -> Result<()> {
        self.find_asset(asset_id)?;

        self.repository.delete(asset_id).await.map_err(|e| {
            error!("Failed to delete asset {}: {}", asset_id, e);
            e
        })?;
        self.refresh_mirror();
        Ok(())
    }

    pub fn state(&self) -> Result<AssetsState> {
        Ok(self.read_state()?.clone())
    }

    pub fn assets(&self) -> Result<Vec<Asset>> {
        Ok(self.read_state()?.assets.clone())
    }

    pub fn total_asset_value(&self) -> Result<Decimal> {
        Ok(self.read_state()?.total_asset_value)
    }

    pub fn is_initialized(&self) -> bool {
        self.read_state().map(|s| s.initialized).unwrap_or(false)
    }

    fn find_asset(&self, asset_id: &str) -> Result<Asset> {
        self.read_state()?
            .assets
            .iter()
            .find(|a| a.id == asset_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(asset_id.to_string()))
    }

    /// The write itself already committed; a failed reload leaves the previous
    /// mirror in place until the next successful one.
    fn refresh_mirror(&self) {
        if let Err(e) = self.reload_data() {
            warn!("Mirror not refreshed: {}", e);
        }
    }

    fn read_state(&self) -> Result<RwLockReadGuard<'_, AssetsState>> {
        self.state
            .read()
            .map_err(|e| Error::Unexpected(e.to_string()))
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, AssetsState>> {
        self.state
            .write()
            .map_err(|e| Error::Unexpected(e.to_string()))
    }
}
