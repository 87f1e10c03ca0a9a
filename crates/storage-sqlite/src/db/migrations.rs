//! Versioned schema upgrades for the asset container.
//!
//! The applied version is kept in SQLite's `PRAGMA user_version`. Opening at a
//! requested version runs, in order and inside one immediate transaction, every
//! step above the stored version, then records the requested version.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer, Text};
use diesel::sqlite::SqliteConnection;
use log::{debug, error, warn};

use crate::errors::{IntoCore, StorageError};
use stashbook_core::errors::Result;

/// Latest layout: allocations embedded in assets, no holdings table.
pub const LATEST_SCHEMA_VERSION: i32 = 2;

pub struct SchemaMigration {
    pub version: i32,
    pub description: &'static str,
    pub up: fn(&mut SqliteConnection) -> QueryResult<()>,
}

pub const MIGRATIONS: &[SchemaMigration] = &[
    SchemaMigration {
        version: 1,
        description: "create assets and holdings",
        up: create_assets_and_holdings,
    },
    SchemaMigration {
        version: 2,
        description: "embed institution allocations in assets, drop holdings",
        up: embed_allocations_drop_holdings,
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub from_version: i32,
    pub to_version: i32,
    pub applied: Vec<i32>,
}

#[derive(QueryableByName)]
struct UserVersion {
    #[diesel(sql_type = Integer)]
    user_version: i32,
}

#[derive(QueryableByName)]
struct Count {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

pub fn stored_version(conn: &mut SqliteConnection) -> Result<i32> {
    let row = diesel::sql_query("PRAGMA user_version")
        .get_result::<UserVersion>(conn)
        .into_core()?;
    Ok(row.user_version)
}

pub fn migrate(conn: &mut SqliteConnection, requested: i32) -> Result<MigrationReport> {
    if !(1..=LATEST_SCHEMA_VERSION).contains(&requested) {
        return Err(StorageError::MigrationFailed(format!(
            "unknown schema version {}",
            requested
        )))
        .into_core();
    }

    let stored = stored_version(conn)?;
    if stored > requested {
        error!(
            "Store is at schema version {}, newer than the requested {}",
            stored, requested
        );
        return Err(StorageError::MigrationFailed(format!(
            "stored schema version {} is newer than requested {}",
            stored, requested
        )))
        .into_core();
    }

    let pending: Vec<&SchemaMigration> = MIGRATIONS
        .iter()
        .filter(|m| m.version > stored && m.version <= requested)
        .collect();

    if !pending.is_empty() {
        conn.immediate_transaction::<_, StorageError, _>(|c| {
            for migration in &pending {
                debug!(
                    "Applying schema migration {}: {}",
                    migration.version, migration.description
                );
                (migration.up)(c).map_err(|e| {
                    StorageError::MigrationFailed(format!(
                        "step {} ({}) failed: {}",
                        migration.version, migration.description, e
                    ))
                })?;
            }
            c.batch_execute(&format!("PRAGMA user_version = {}", requested))?;
            Ok(())
        })
        .into_core()?;
    }

    Ok(MigrationReport {
        from_version: stored,
        to_version: requested,
        applied: pending.iter().map(|m| m.version).collect(),
    })
}

fn table_exists(conn: &mut SqliteConnection, table: &str) -> QueryResult<bool> {
    let row = diesel::sql_query(
        "SELECT COUNT(*) AS count FROM sqlite_master WHERE type = 'table' AND name = ?",
    )
    .bind::<Text, _>(table)
    .get_result::<Count>(conn)?;
    Ok(row.count > 0)
}

fn column_exists(conn: &mut SqliteConnection, table: &str, column: &str) -> QueryResult<bool> {
    let row = diesel::sql_query(
        "SELECT COUNT(*) AS count FROM pragma_table_info(?) WHERE name = ?",
    )
    .bind::<Text, _>(table)
    .bind::<Text, _>(column)
    .get_result::<Count>(conn)?;
    Ok(row.count > 0)
}

fn create_assets_and_holdings(conn: &mut SqliteConnection) -> QueryResult<()> {
    conn.batch_execute(
        "
        CREATE TABLE IF NOT EXISTS assets (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            target_ratio INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_assets_name ON assets (name);
        CREATE INDEX IF NOT EXISTS idx_assets_created_at ON assets (created_at);

        CREATE TABLE IF NOT EXISTS holdings (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            code TEXT,
            asset_id TEXT NOT NULL,
            amount TEXT NOT NULL,
            institution_details TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_holdings_asset_id ON holdings (asset_id);
        CREATE INDEX IF NOT EXISTS idx_holdings_name ON holdings (name);
        CREATE INDEX IF NOT EXISTS idx_holdings_created_at ON holdings (created_at);
        ",
    )
}

// Holding rows are dropped as-is; they are not folded into asset allocations.
fn embed_allocations_drop_holdings(conn: &mut SqliteConnection) -> QueryResult<()> {
    if !column_exists(conn, "assets", "institutions")? {
        conn.batch_execute(
            "ALTER TABLE assets ADD COLUMN institutions TEXT NOT NULL DEFAULT '[]'",
        )?;
    }
    if table_exists(conn, "holdings")? {
        let orphaned = diesel::sql_query("SELECT COUNT(*) AS count FROM holdings")
            .get_result::<Count>(conn)?
            .count;
        if orphaned > 0 {
            warn!(
                "Dropping {} holdings; their amounts are not carried into asset allocations",
                orphaned
            );
        }
        conn.batch_execute("DROP TABLE holdings")?;
    }
    Ok(())
}
