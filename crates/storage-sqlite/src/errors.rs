//! Storage-specific error types for SQLite operations.
//!
//! This module provides error types that wrap Diesel-specific errors and convert
//! them to the database-agnostic error types defined in `stashbook_core`.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use stashbook_core::errors::{DatabaseError, Error};
use thiserror::Error;

/// Storage-specific errors that wrap Diesel, r2d2 and I/O types.
///
/// These errors are internal to the storage layer and are converted to
/// `stashbook_core::Error` before being returned to callers.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(#[from] diesel::ConnectionError),

    #[error("Connection pool error: {0}")]
    PoolError(#[from] r2d2::Error),

    #[error("Query execution failed: {0}")]
    QueryFailed(#[from] DieselError),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A core error raised inside a writer job, carried through unchanged.
    #[error(transparent)]
    Core(#[from] Error),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::SerializationError(err.to_string())
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ConnectionFailed(e) => {
                Error::Database(DatabaseError::StorageUnavailable(e.to_string()))
            }
            StorageError::PoolError(e) => {
                Error::Database(DatabaseError::StorageUnavailable(e.to_string()))
            }
            StorageError::QueryFailed(DieselError::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                info,
            )) => Error::Database(DatabaseError::DuplicateKey(info.message().to_string())),
            StorageError::QueryFailed(e) => {
                Error::Database(DatabaseError::QueryFailed(e.to_string()))
            }
            StorageError::MigrationFailed(e) => Error::Database(DatabaseError::MigrationFailed(e)),
            StorageError::SerializationError(e) => {
                Error::Database(DatabaseError::Serialization(e))
            }
            StorageError::Io(e) => Error::Database(DatabaseError::StorageUnavailable(e.to_string())),
            StorageError::Core(e) => e,
        }
    }
}

/// Extension trait for easily converting storage-side Results to core Results.
///
/// This provides a `.into_core()` method on any `Result<T, E>` whose error
/// converts into `StorageError`.
pub trait IntoCore<T> {
    fn into_core(self) -> stashbook_core::Result<T>;
}

impl<T, E> IntoCore<T> for std::result::Result<T, E>
where
    E: Into<StorageError>,
{
    fn into_core(self) -> stashbook_core::Result<T> {
        self.map_err(|e| Error::from(e.into()))
    }
}
