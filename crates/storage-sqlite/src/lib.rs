//! SQLite storage implementation for Stashbook.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `stashbook-core` and contains:
//! - Database connection pooling and the single-writer actor
//! - The versioned schema migration engine
//! - The asset container (`AssetStore`) and its Diesel model types
//! - The file-backed flat storage read by the legacy importer
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! The `core` crate is database-agnostic and works with traits.
//!
//! ```text
//!          core (domain)
//!                │
//!                ▼
//!        storage-sqlite (this crate)
//!                │
//!                ▼
//!            SQLite DB
//! ```

pub mod assets;
pub mod db;
pub mod errors;
pub mod legacy;
pub mod schema;

pub use assets::AssetStore;
pub use legacy::FileKeyValueStore;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, migrate, run_migrations, DbConnection, DbPool,
    MigrationReport, WriteHandle, LATEST_SCHEMA_VERSION,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from stashbook-core for convenience
pub use stashbook_core::errors::{DatabaseError, Error, Result};
