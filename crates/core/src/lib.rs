//! Stashbook Core - Domain entities, services, and traits.
//!
//! This crate contains the asset bookkeeping logic for Stashbook.
//! It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` crate.

pub mod assets;
pub mod constants;
pub mod errors;
pub mod legacy;
pub mod snapshot;
pub mod state;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_utils;

pub use assets::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
