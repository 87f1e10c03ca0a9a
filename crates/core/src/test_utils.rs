//! In-memory doubles for the storage traits, shared by the service tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::assets::{Asset, AssetRepositoryTrait, HoldingRepositoryTrait};
use crate::errors::{DatabaseError, Error, Result};
use crate::legacy::{LegacyHolding, LegacyStorageTrait};

#[derive(Default)]
pub struct MockAssetRepository {
    pub assets: Mutex<HashMap<String, Asset>>,
    /// `Some` when the mock emulates the legacy schema with a holdings collection.
    pub holdings: Mutex<Option<HashMap<String, LegacyHolding>>>,
    pub opened: AtomicBool,
    pub open_calls: AtomicUsize,
    pub fail_open: AtomicBool,
    pub fail_writes: AtomicBool,
    pub fail_reads: AtomicBool,
    /// Ids for which both `add` and `put` fail.
    pub rejected_ids: Mutex<HashSet<String>>,
    pub writes: AtomicUsize,
    pub open_delay: Option<Duration>,
    /// Delay applied once, after the next `list()` has taken its snapshot.
    pub next_list_delay: Mutex<Option<Duration>>,
    /// Number of writes still allowed before every further write fails.
    pub writes_before_failure: Mutex<Option<usize>>,
}

impl MockAssetRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_legacy_holdings() -> Self {
        let repo = Self::default();
        *repo.holdings.lock().unwrap() = Some(HashMap::new());
        repo
    }

    pub fn with_open_delay(delay: Duration) -> Self {
        Self {
            open_delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn delay_next_list(&self, delay: Duration) {
        *self.next_list_delay.lock().unwrap() = Some(delay);
    }

    pub fn fail_writes_after(&self, allowed: usize) {
        *self.writes_before_failure.lock().unwrap() = Some(allowed);
    }

    pub fn seed(&self, asset: Asset) {
        self.assets.lock().unwrap().insert(asset.id.clone(), asset);
    }

    pub fn reject(&self, id: &str) {
        self.rejected_ids.lock().unwrap().insert(id.to_string());
    }

    pub fn stored(&self, id: &str) -> Option<Asset> {
        self.assets.lock().unwrap().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.assets.lock().unwrap().len()
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_write(&self, id: &str) -> Result<()> {
        if !self.opened.load(Ordering::SeqCst) {
            return Err(DatabaseError::StorageUnavailable("store is not open".to_string()).into());
        }
        if self.fail_writes.load(Ordering::SeqCst) || self.rejected_ids.lock().unwrap().contains(id)
        {
            return Err(DatabaseError::QueryFailed(format!("write rejected for {}", id)).into());
        }
        if let Some(remaining) = self.writes_before_failure.lock().unwrap().as_mut() {
            if *remaining == 0 {
                return Err(DatabaseError::QueryFailed(format!("write failed for {}", id)).into());
            }
            *remaining -= 1;
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl AssetRepositoryTrait for MockAssetRepository {
    async fn open(&self) -> Result<i32> {
        self.open_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.open_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(DatabaseError::StorageUnavailable("disk full".to_string()).into());
        }
        self.opened.store(true, Ordering::SeqCst);
        Ok(2)
    }

    fn schema_version(&self) -> Option<i32> {
        self.opened.load(Ordering::SeqCst).then_some(2)
    }

    fn list(&self) -> Result<Vec<Asset>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DatabaseError::QueryFailed("read failed".to_string()).into());
        }
        let snapshot: Vec<Asset> = self.assets.lock().unwrap().values().cloned().collect();
        if let Some(delay) = self.next_list_delay.lock().unwrap().take() {
            std::thread::sleep(delay);
        }
        Ok(snapshot)
    }

    async fn add(&self, asset: Asset) -> Result<()> {
        if self.assets.lock().unwrap().contains_key(&asset.id) {
            return Err(Error::Database(DatabaseError::DuplicateKey(asset.id)));
        }
        self.check_write(&asset.id)?;
        self.seed(asset);
        Ok(())
    }

    async fn put(&self, asset: Asset) -> Result<()> {
        self.check_write(&asset.id)?;
        self.seed(asset);
        Ok(())
    }

    async fn delete(&self, asset_id: &str) -> Result<()> {
        self.check_write(asset_id)?;
        self.assets.lock().unwrap().remove(asset_id);
        Ok(())
    }
}

#[async_trait]
impl HoldingRepositoryTrait for MockAssetRepository {
    fn list_holdings(&self) -> Result<Vec<LegacyHolding>> {
        Ok(self
            .holdings
            .lock()
            .unwrap()
            .as_ref()
            .map(|h| h.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn add_holding(&self, holding: LegacyHolding) -> Result<()> {
        let mut guard = self.holdings.lock().unwrap();
        let holdings = guard
            .as_mut()
            .ok_or_else(|| Error::Database(DatabaseError::CollectionMissing("holdings".into())))?;
        if holdings.contains_key(&holding.id) {
            return Err(Error::Database(DatabaseError::DuplicateKey(holding.id)));
        }
        holdings.insert(holding.id.clone(), holding);
        Ok(())
    }

    async fn put_holding(&self, holding: LegacyHolding) -> Result<()> {
        let mut guard = self.holdings.lock().unwrap();
        let holdings = guard
            .as_mut()
            .ok_or_else(|| Error::Database(DatabaseError::CollectionMissing("holdings".into())))?;
        holdings.insert(holding.id.clone(), holding);
        Ok(())
    }

    async fn delete_holding(&self, holding_id: &str) -> Result<()> {
        if let Some(holdings) = self.holdings.lock().unwrap().as_mut() {
            holdings.remove(holding_id);
        }
        Ok(())
    }

    async fn delete_holdings_by_asset_id(&self, asset_id: &str) -> Result<usize> {
        let mut guard = self.holdings.lock().unwrap();
        let Some(holdings) = guard.as_mut() else {
            return Ok(0);
        };
        let before = holdings.len();
        holdings.retain(|_, h| h.asset_id != asset_id);
        Ok(before - holdings.len())
    }
}

#[derive(Default)]
pub struct MockLegacyStorage {
    pub items: Mutex<HashMap<String, String>>,
}

impl MockLegacyStorage {
    pub fn with_item(key: &str, value: &str) -> Self {
        let storage = Self::default();
        storage
            .items
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        storage
    }

    pub fn contains(&self, key: &str) -> bool {
        self.items.lock().unwrap().contains_key(key)
    }
}

impl LegacyStorageTrait for MockLegacyStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.lock().unwrap().get(key).cloned())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.items.lock().unwrap().remove(key);
        Ok(())
    }
}

pub fn asset(id: &str, name: &str) -> Asset {
    Asset {
        id: id.to_string(),
        name: name.to_string(),
        target_ratio: None,
        institutions: vec![],
        created_at: "2024-01-01T00:00:00.000Z".to_string(),
        updated_at: "2024-01-01T00:00:00.000Z".to_string(),
    }
}
