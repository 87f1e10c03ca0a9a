use crate::errors::Result;

/// Flat key-value storage that held application state before the versioned store.
pub trait LegacyStorageTrait: Send + Sync {
    /// Raw document stored under `key`, if any.
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    /// Removes the document under `key`. Absent keys are not an error.
    fn remove_item(&self, key: &str) -> Result<()>;
}
