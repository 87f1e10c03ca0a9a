use serde::{Deserialize, Serialize};
use stashbook_core::snapshot::{ClearSummary, ImportSummary};

/// How an uploaded snapshot is applied to the store.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Upsert every record, leaving other records in place.
    #[default]
    Merge,
    /// Clear the store first, then merge.
    Replace,
}

#[derive(Deserialize, Debug, Default)]
pub struct ImportParams {
    #[serde(default)]
    pub mode: ImportMode,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    pub mode: ImportMode,
    pub imported: ImportSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleared: Option<ClearSummary>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    pub valid: bool,
    pub assets: usize,
    pub holdings: usize,
}
