//! Core error types for the Stashbook application.
//!
//! This module defines database-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, etc.) are converted to these types by the storage layer.

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("The document is not a valid snapshot file: {0}")]
    MalformedDocument(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// True when the error is a primary-key conflict on insert.
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Error::Database(DatabaseError::DuplicateKey(_)))
    }

    /// True when the storage container could not be opened or used at all.
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, Error::Database(DatabaseError::StorageUnavailable(_)))
    }
}

/// Database-agnostic error type for storage operations.
///
/// This enum uses `String` for all error details, allowing the storage layer
/// to convert storage-specific errors into this format.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// The store could not be opened (I/O, permissions, corruption, version).
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A record with the same key already exists.
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// The requested collection does not exist under the opened schema.
    #[error("Collection '{0}' does not exist in this schema version")]
    CollectionMissing(String),

    /// A database query failed to execute.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// Schema migration failed.
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// A stored value could not be encoded or decoded.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Internal/unexpected database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Validation errors for user input and imported documents.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid snapshot document at {path}: {reason}")]
    ValidationFailed { path: String, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),
}

impl ValidationError {
    pub fn at(path: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::ValidationFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Database(DatabaseError::Serialization(err.to_string()))
    }
}
