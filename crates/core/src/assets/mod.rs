//! Assets module - domain models and repository traits.

mod assets_model;
mod assets_traits;


pub use assets_model::{Asset, AssetUpdate, InstitutionAllocation, NewAsset};
pub use assets_traits::{AssetRepositoryTrait, HoldingRepositoryTrait};
