//! SQLite storage implementation for assets and the legacy holdings table.

mod model;
mod repository;

pub use model::{AssetDB, HoldingDB};
pub use repository::AssetStore;
