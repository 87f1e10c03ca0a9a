use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::{debug, error, info};
use tokio::sync::OnceCell;

use super::model::{AssetDB, HoldingDB};
use crate::db::{self, get_connection, spawn_writer, DbPool, WriteHandle, LATEST_SCHEMA_VERSION};
use crate::errors::IntoCore;
use crate::schema::{assets, holdings};
use stashbook_core::assets::{Asset, AssetRepositoryTrait, HoldingRepositoryTrait};
use stashbook_core::errors::{DatabaseError, Error, Result};
use stashbook_core::legacy::LegacyHolding;

/// First schema version with allocations embedded in assets and no holdings table.
const EMBEDDED_ALLOCATIONS_VERSION: i32 = 2;

struct StoreHandle {
    pool: Arc<DbPool>,
    writer: WriteHandle,
    schema_version: i32,
}

impl StoreHandle {
    fn has_holdings(&self) -> bool {
        self.schema_version < EMBEDDED_ALLOCATIONS_VERSION
    }
}

/// SQLite-backed asset container.
///
/// Nothing touches the file until `open`, which creates or migrates it to the
/// requested schema version. Reads go through the pool; every write is one job
/// on the single writer.
pub struct AssetStore {
    db_path: String,
    requested_version: i32,
    handle: OnceCell<StoreHandle>,
}

impl AssetStore {
    pub fn new(db_path: impl Into<String>) -> Self {
        Self::with_schema_version(db_path, LATEST_SCHEMA_VERSION)
    }

    /// Store that opens at an explicit schema version instead of the latest.
    pub fn with_schema_version(db_path: impl Into<String>, version: i32) -> Self {
        AssetStore {
            db_path: db_path.into(),
            requested_version: version,
            handle: OnceCell::new(),
        }
    }

    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    fn connect(&self) -> Result<StoreHandle> {
        db::init(&self.db_path)?;
        let pool = db::create_pool(&self.db_path)?;
        let report = db::run_migrations(&pool, self.requested_version)?;
        let writer = spawn_writer(&pool)?;
        Ok(StoreHandle {
            pool,
            writer,
            schema_version: report.to_version,
        })
    }

    fn handle(&self) -> Result<&StoreHandle> {
        self.handle.get().ok_or_else(|| {
            Error::Database(DatabaseError::StorageUnavailable(
                "asset store is not open".to_string(),
            ))
        })
    }

    fn holdings_handle(&self) -> Result<&StoreHandle> {
        let handle = self.handle()?;
        if handle.has_holdings() {
            Ok(handle)
        } else {
            Err(Error::Database(DatabaseError::CollectionMissing(
                "holdings".to_string(),
            )))
        }
    }
}

fn unavailable(err: Error) -> Error {
    if err.is_storage_unavailable() {
        err
    } else {
        Error::Database(DatabaseError::StorageUnavailable(err.to_string()))
    }
}

fn write_asset(
    conn: &mut SqliteConnection,
    row: &AssetDB,
    embedded_allocations: bool,
    replace: bool,
) -> QueryResult<usize> {
    if embedded_allocations {
        if replace {
            diesel::replace_into(assets::table).values(row).execute(conn)
        } else {
            diesel::insert_into(assets::table).values(row).execute(conn)
        }
    } else {
        // Flat layout: allocations have nowhere to go before version 2.
        let values = (
            assets::id.eq(&row.id),
            assets::name.eq(&row.name),
            assets::target_ratio.eq(row.target_ratio),
            assets::created_at.eq(&row.created_at),
            assets::updated_at.eq(&row.updated_at),
        );
        if replace {
            diesel::replace_into(assets::table).values(values).execute(conn)
        } else {
            diesel::insert_into(assets::table).values(values).execute(conn)
        }
    }
}

fn with_duplicate_id(err: Error, id: &str) -> Error {
    if err.is_duplicate_key() {
        Error::Database(DatabaseError::DuplicateKey(id.to_string()))
    } else {
        err
    }
}

#[async_trait]
impl AssetRepositoryTrait for AssetStore {
    async fn open(&self) -> Result<i32> {
        let handle = self
            .handle
            .get_or_try_init(|| async {
                info!("Opening asset store at {}", self.db_path);
                self.connect().map_err(|e| {
                    error!("Failed to open asset store at {}: {}", self.db_path, e);
                    unavailable(e)
                })
            })
            .await?;
        Ok(handle.schema_version)
    }

    fn schema_version(&self) -> Option<i32> {
        self.handle.get().map(|h| h.schema_version)
    }

    fn list(&self) -> Result<Vec<Asset>> {
        let handle = self.handle()?;
        let mut conn = get_connection(&handle.pool)?;

        if handle.has_holdings() {
            let rows = assets::table
                .select((
                    assets::id,
                    assets::name,
                    assets::target_ratio,
                    assets::created_at,
                    assets::updated_at,
                ))
                .load::<(String, String, Option<i32>, String, String)>(&mut conn)
                .into_core()?;
            return Ok(rows
                .into_iter()
                .map(|(id, name, target_ratio, created_at, updated_at)| Asset {
                    id,
                    name,
                    target_ratio,
                    institutions: Vec::new(),
                    created_at,
                    updated_at,
                })
                .collect());
        }

        assets::table
            .select(AssetDB::as_select())
            .load::<AssetDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(|row| Asset::try_from(row).into_core())
            .collect()
    }

    async fn add(&self, asset: Asset) -> Result<()> {
        let handle = self.handle()?;
        let embedded = !handle.has_holdings();
        let row = AssetDB::try_from(asset).into_core()?;

        handle
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                write_asset(conn, &row, embedded, false)
                    .into_core()
                    .map_err(|e| with_duplicate_id(e, &row.id))?;
                Ok(())
            })
            .await
    }

    async fn put(&self, asset: Asset) -> Result<()> {
        let handle = self.handle()?;
        let embedded = !handle.has_holdings();
        let row = AssetDB::try_from(asset).into_core()?;

        handle
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                write_asset(conn, &row, embedded, true).into_core()?;
                Ok(())
            })
            .await
    }

    async fn delete(&self, asset_id: &str) -> Result<()> {
        let handle = self.handle()?;
        let cascade = handle.has_holdings();
        let asset_id = asset_id.to_string();

        handle
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                if cascade {
                    let removed = diesel::delete(
                        holdings::table.filter(holdings::asset_id.eq(&asset_id)),
                    )
                    .execute(conn)
                    .into_core()?;
                    if removed > 0 {
                        debug!("Removed {} holdings of asset {}", removed, asset_id);
                    }
                }
                diesel::delete(assets::table.find(&asset_id))
                    .execute(conn)
                    .into_core()?;
                Ok(())
            })
            .await
    }
}

#[async_trait]
impl HoldingRepositoryTrait for AssetStore {
    fn list_holdings(&self) -> Result<Vec<LegacyHolding>> {
        let handle = self.handle()?;
        if !handle.has_holdings() {
            return Ok(Vec::new());
        }
        let mut conn = get_connection(&handle.pool)?;

        holdings::table
            .select(HoldingDB::as_select())
            .load::<HoldingDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(|row| LegacyHolding::try_from(row).into_core())
            .collect()
    }

    async fn add_holding(&self, holding: LegacyHolding) -> Result<()> {
        let handle = self.holdings_handle()?;
        let row = HoldingDB::try_from(holding).into_core()?;

        handle
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::insert_into(holdings::table)
                    .values(&row)
                    .execute(conn)
                    .into_core()
                    .map_err(|e| with_duplicate_id(e, &row.id))?;
                Ok(())
            })
            .await
    }

    async fn put_holding(&self, holding: LegacyHolding) -> Result<()> {
        let handle = self.holdings_handle()?;
        let row = HoldingDB::try_from(holding).into_core()?;

        handle
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::replace_into(holdings::table)
                    .values(&row)
                    .execute(conn)
                    .into_core()?;
                Ok(())
            })
            .await
    }

    async fn delete_holding(&self, holding_id: &str) -> Result<()> {
        let handle = self.holdings_handle()?;
        let holding_id = holding_id.to_string();

        handle
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::delete(holdings::table.find(holding_id))
                    .execute(conn)
                    .into_core()?;
                Ok(())
            })
            .await
    }

    async fn delete_holdings_by_asset_id(&self, asset_id: &str) -> Result<usize> {
        let handle = self.holdings_handle()?;
        let asset_id = asset_id.to_string();

        handle
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                diesel::delete(holdings::table.filter(holdings::asset_id.eq(asset_id)))
                    .execute(conn)
                    .into_core()
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use stashbook_core::assets::InstitutionAllocation;
    use tempfile::TempDir;

    fn db_path(dir: &TempDir) -> String {
        dir.path()
            .join("data")
            .join("stashbook.db")
            .to_string_lossy()
            .to_string()
    }

    fn asset(id: &str, name: &str) -> Asset {
        Asset {
            id: id.to_string(),
            name: name.to_string(),
            target_ratio: Some(25),
            institutions: vec![InstitutionAllocation {
                institution: "招商银行".to_string(),
                amount: dec!(300.25),
            }],
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
            updated_at: "2024-01-01T00:00:00.000Z".to_string(),
        }
    }

    fn holding(id: &str, asset_id: &str) -> LegacyHolding {
        LegacyHolding {
            id: id.to_string(),
            name: format!("Holding {}", id),
            code: None,
            asset_id: asset_id.to_string(),
            amount: dec!(50),
            institution_details: None,
            created_at: "2023-01-01T00:00:00.000Z".to_string(),
            updated_at: "2023-01-01T00:00:00.000Z".to_string(),
        }
    }

    async fn open_store(path: &str) -> AssetStore {
        let store = AssetStore::new(path);
        store.open().await.unwrap();
        store
    }

    #[tokio::test]
    async fn operations_before_open_are_unavailable() {
        let dir = TempDir::new().unwrap();
        let store = AssetStore::new(db_path(&dir));

        assert_eq!(store.schema_version(), None);
        assert!(store.list().unwrap_err().is_storage_unavailable());
        assert!(store
            .add(asset("a-1", "Cash"))
            .await
            .unwrap_err()
            .is_storage_unavailable());
    }

    #[tokio::test]
    async fn fresh_container_opens_at_latest_without_holdings() {
        let dir = TempDir::new().unwrap();
        let store = AssetStore::new(db_path(&dir));

        assert_eq!(store.open().await.unwrap(), LATEST_SCHEMA_VERSION);
        assert_eq!(store.open().await.unwrap(), LATEST_SCHEMA_VERSION);
        assert!(store.list().unwrap().is_empty());
        assert!(store.list_holdings().unwrap().is_empty());

        let err = store.add_holding(holding("h-1", "a-1")).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Database(DatabaseError::CollectionMissing(_))
        ));
    }

    #[tokio::test]
    async fn add_rejects_existing_id() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&db_path(&dir)).await;

        store.add(asset("a-1", "Cash")).await.unwrap();
        let err = store.add(asset("a-1", "Other")).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Database(DatabaseError::DuplicateKey(ref id)) if id == "a-1"
        ));
        assert_eq!(store.list().unwrap(), vec![asset("a-1", "Cash")]);
    }

    #[tokio::test]
    async fn put_inserts_or_replaces_whole_record() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&db_path(&dir)).await;

        store.put(asset("a-1", "Cash")).await.unwrap();
        let mut replacement = asset("a-1", "Cash reserve");
        replacement.target_ratio = None;
        replacement.institutions = vec![];
        store.put(replacement.clone()).await.unwrap();

        assert_eq!(store.list().unwrap(), vec![replacement]);
    }

    #[tokio::test]
    async fn delete_is_silent_for_unknown_ids() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&db_path(&dir)).await;
        store.add(asset("a-1", "Cash")).await.unwrap();

        store.delete("missing").await.unwrap();
        store.delete("a-1").await.unwrap();

        assert!(store.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn data_survives_reopening() {
        let dir = TempDir::new().unwrap();
        let path = db_path(&dir);
        {
            let store = open_store(&path).await;
            store.add(asset("a-1", "Cash")).await.unwrap();
        }

        let reopened = open_store(&path).await;
        assert_eq!(reopened.list().unwrap(), vec![asset("a-1", "Cash")]);
    }

    #[tokio::test]
    async fn legacy_container_cascades_holding_deletes() {
        let dir = TempDir::new().unwrap();
        let store = AssetStore::with_schema_version(db_path(&dir), 1);
        assert_eq!(store.open().await.unwrap(), 1);

        store.add(asset("a-1", "Funds")).await.unwrap();
        store.add(asset("a-2", "Cash")).await.unwrap();
        store.add_holding(holding("h-1", "a-1")).await.unwrap();
        store.add_holding(holding("h-2", "a-1")).await.unwrap();
        store.add_holding(holding("h-3", "a-2")).await.unwrap();

        // Flat layout has no allocation column.
        assert!(store.list().unwrap().iter().all(|a| a.institutions.is_empty()));

        store.delete("a-1").await.unwrap();
        let remaining = store.list_holdings().unwrap();
        assert_eq!(remaining, vec![holding("h-3", "a-2")]);

        assert_eq!(store.delete_holdings_by_asset_id("a-2").await.unwrap(), 1);
        assert!(store.list_holdings().unwrap().is_empty());
    }

    #[tokio::test]
    async fn upgrade_keeps_assets_and_drops_holdings() {
        let dir = TempDir::new().unwrap();
        let path = db_path(&dir);
        {
            let legacy = AssetStore::with_schema_version(path.clone(), 1);
            legacy.open().await.unwrap();
            legacy.add(asset("a-1", "Funds")).await.unwrap();
            legacy.add_holding(holding("h-1", "a-1")).await.unwrap();
        }

        let store = open_store(&path).await;

        assert_eq!(store.schema_version(), Some(LATEST_SCHEMA_VERSION));
        let assets = store.list().unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].name, "Funds");
        assert!(assets[0].institutions.is_empty());
        assert!(store.list_holdings().unwrap().is_empty());
    }

    #[tokio::test]
    async fn opening_below_stored_version_fails() {
        let dir = TempDir::new().unwrap();
        let path = db_path(&dir);
        open_store(&path).await;

        let older = AssetStore::with_schema_version(path, 1);
        let err = older.open().await.unwrap_err();

        assert!(err.is_storage_unavailable());
        assert_eq!(older.schema_version(), None);
    }
}
