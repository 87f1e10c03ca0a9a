//! Legacy module - pre-versioned data shapes and the one-shot importer.

mod legacy_importer;
mod legacy_model;
mod legacy_traits;


pub use legacy_importer::{LegacyImportReport, LegacyImporter};
pub use legacy_model::{LegacyHolding, LegacyState};
pub use legacy_traits::LegacyStorageTrait;
