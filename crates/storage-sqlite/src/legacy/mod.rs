//! Flat key-value storage holding documents written by pre-versioned releases.

mod file_store;

pub use file_store::FileKeyValueStore;
