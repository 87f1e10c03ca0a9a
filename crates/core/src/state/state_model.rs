use rust_decimal::Decimal;
use serde::Serialize;

use crate::assets::Asset;

/// Read-mostly view of the in-memory mirror handed to consumers.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssetsState {
    pub assets: Vec<Asset>,
    pub total_asset_value: Decimal,
    pub initialized: bool,
    pub loading: bool,
}

/// Total value across every asset's allocations.
pub fn calculate_total_value(assets: &[Asset]) -> Decimal {
    assets.iter().map(Asset::total_value).sum()
}
