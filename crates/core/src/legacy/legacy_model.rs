//! Shapes of data written by releases that predate the versioned store.

use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::assets::InstitutionAllocation;

/// Holding record from schema version 1, when holdings lived in their own
/// collection keyed by id and indexed by owning asset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LegacyHolding {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(deserialize_with = "deserialize_asset_id")]
    pub asset_id: String,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution_details: Option<Vec<InstitutionAllocation>>,
    pub created_at: String,
    pub updated_at: String,
}

/// Body of the flat legacy document, either at the top level or under `state`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyState {
    #[serde(default)]
    pub assets: Option<serde_json::Value>,
    #[serde(default)]
    pub holdings: Option<serde_json::Value>,
}

impl LegacyState {
    /// Extracts the state from `{ state: {...} }` or the unwrapped equivalent.
    pub fn from_document(document: serde_json::Value) -> serde_json::Result<Self> {
        match document {
            serde_json::Value::Object(mut map) => match map.remove("state") {
                Some(state @ serde_json::Value::Object(_)) => serde_json::from_value(state),
                Some(_) | None => serde_json::from_value(serde_json::Value::Object(map)),
            },
            other => serde_json::from_value(other),
        }
    }

    /// Asset entries when `assets` is an array, otherwise nothing.
    pub fn asset_entries(&self) -> &[serde_json::Value] {
        array_entries(self.assets.as_ref())
    }

    pub fn holding_entries(&self) -> &[serde_json::Value] {
        array_entries(self.holdings.as_ref())
    }
}

fn array_entries(value: Option<&serde_json::Value>) -> &[serde_json::Value] {
    match value {
        Some(serde_json::Value::Array(items)) => items.as_slice(),
        _ => &[],
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

/// Older writers sometimes stored the owning asset id as a one-element list.
fn deserialize_asset_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(id) => Ok(id),
        OneOrMany::Many(ids) => ids
            .into_iter()
            .next()
            .ok_or_else(|| de::Error::custom("assetId list is empty")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn holding_asset_id_list_is_coerced_to_scalar() {
        let holding: LegacyHolding = serde_json::from_value(json!({
            "id": "h-1",
            "name": "Fund",
            "assetId": ["a-1"],
            "amount": 12.5,
            "createdAt": "2024-01-01T00:00:00.000Z",
            "updatedAt": "2024-01-01T00:00:00.000Z"
        }))
        .unwrap();
        assert_eq!(holding.asset_id, "a-1");
        assert_eq!(holding.amount, dec!(12.5));
        assert!(holding.institution_details.is_none());
    }

    #[test]
    fn holding_rejects_empty_asset_id_list() {
        let result = serde_json::from_value::<LegacyHolding>(json!({
            "id": "h-1",
            "name": "Fund",
            "assetId": [],
            "amount": 1,
            "createdAt": "2024-01-01T00:00:00.000Z",
            "updatedAt": "2024-01-01T00:00:00.000Z"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn state_is_read_from_wrapper_or_top_level() {
        let wrapped = LegacyState::from_document(json!({
            "state": { "assets": [{ "id": "a" }], "holdings": [] },
            "version": 0
        }))
        .unwrap();
        assert_eq!(wrapped.asset_entries().len(), 1);

        let unwrapped = LegacyState::from_document(json!({
            "assets": [{ "id": "a" }, { "id": "b" }]
        }))
        .unwrap();
        assert_eq!(unwrapped.asset_entries().len(), 2);
        assert!(unwrapped.holding_entries().is_empty());
    }

    #[test]
    fn non_array_assets_yield_no_entries() {
        let state = LegacyState::from_document(json!({ "assets": { "id": "a" } })).unwrap();
        assert!(state.asset_entries().is_empty());
    }
}
