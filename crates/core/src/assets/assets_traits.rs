use super::assets_model::Asset;
use crate::errors::Result;
use crate::legacy::LegacyHolding;

/// Contract for the persistent asset store.
///
/// Every write is its own transaction; there is no multi-record batch.
#[async_trait::async_trait]
pub trait AssetRepositoryTrait: Send + Sync {
    /// Opens the store at its requested schema version, migrating if needed.
    /// Returns the opened version. Calling it again is a no-op.
    async fn open(&self) -> Result<i32>;
    /// Version the store was opened at, `None` before `open`.
    fn schema_version(&self) -> Option<i32>;
    /// All assets, in no particular order.
    fn list(&self) -> Result<Vec<Asset>>;
    /// Inserts a new asset. Fails with `DuplicateKey` when the id exists.
    async fn add(&self, asset: Asset) -> Result<()>;
    /// Full-record upsert by id.
    async fn put(&self, asset: Asset) -> Result<()>;
    /// Removes an asset. Absent ids are not an error.
    async fn delete(&self, asset_id: &str) -> Result<()>;
}

/// Contract for the legacy holdings collection (schema version 1 only).
#[async_trait::async_trait]
pub trait HoldingRepositoryTrait: Send + Sync {
    /// All legacy holdings; empty when the collection does not exist.
    fn list_holdings(&self) -> Result<Vec<LegacyHolding>>;
    async fn add_holding(&self, holding: LegacyHolding) -> Result<()>;
    async fn put_holding(&self, holding: LegacyHolding) -> Result<()>;
    async fn delete_holding(&self, holding_id: &str) -> Result<()>;
    /// Removes every holding owned by `asset_id` through the secondary index.
    async fn delete_holdings_by_asset_id(&self, asset_id: &str) -> Result<usize>;
}
