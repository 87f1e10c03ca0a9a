//! Portable snapshot document and import/clear outcomes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::assets::Asset;
use crate::constants::SNAPSHOT_FORMAT_VERSION;
use crate::legacy::LegacyHolding;
use crate::utils::time_utils::now_iso;

/// Full-store export envelope.
///
/// `holdings` is kept for older consumers of the format even though the
/// current schema has no independent holdings collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotDocument {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub export_date: String,
    pub assets: Vec<Asset>,
    pub holdings: Vec<LegacyHolding>,
    #[serde(default)]
    pub total_count: TotalCount,
}

impl SnapshotDocument {
    pub fn new(assets: Vec<Asset>, holdings: Vec<LegacyHolding>) -> Self {
        let total_count = TotalCount {
            assets: assets.len(),
            holdings: holdings.len(),
        };
        Self {
            version: SNAPSHOT_FORMAT_VERSION.to_string(),
            export_date: now_iso(),
            assets,
            holdings,
            total_count,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TotalCount {
    pub assets: usize,
    pub holdings: usize,
}

/// Records actually persisted by a merge import, plus the ones given up on.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub assets: usize,
    pub holdings: usize,
    pub assets_failed: usize,
    pub holdings_failed: usize,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ClearSummary {
    pub assets: usize,
    pub holdings: usize,
}

/// Suggested file name for delivering an export taken on `date`.
pub fn snapshot_file_name(date: NaiveDate) -> String {
    format!("asset-snapshot_{}.json", date.format("%Y-%m-%d"))
}
