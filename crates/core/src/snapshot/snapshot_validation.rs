//! Structural checks on externally supplied snapshot documents.
//!
//! Validation is all-or-nothing and runs before any write. It works on the raw
//! JSON value so that the first offending path can be reported precisely.

use serde_json::{Map, Value};

use super::snapshot_model::SnapshotDocument;
use crate::errors::{Error, Result, ValidationError};

/// Parses, validates and decodes a snapshot document.
///
/// Text that is not JSON at all yields `MalformedDocument`; JSON that does not
/// have the snapshot shape yields `ValidationFailed`.
pub fn parse_snapshot(text: &str) -> Result<SnapshotDocument> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| Error::MalformedDocument(e.to_string()))?;
    validate_snapshot(&value)?;
    serde_json::from_value(value).map_err(|e| ValidationError::at("$", e.to_string()).into())
}

pub fn validate_snapshot(document: &Value) -> Result<()> {
    let root = as_object(document, "$")?;
    let assets = require_array(root, "assets", "$")?;
    let holdings = require_array(root, "holdings", "$")?;

    for (index, asset) in assets.iter().enumerate() {
        validate_asset(asset, &format!("$.assets[{}]", index))?;
    }
    for (index, holding) in holdings.iter().enumerate() {
        validate_holding(holding, &format!("$.holdings[{}]", index))?;
    }
    Ok(())
}

fn validate_asset(value: &Value, path: &str) -> Result<()> {
    let asset = as_object(value, path)?;
    for key in ["id", "name", "createdAt", "updatedAt"] {
        require_non_empty_string(asset, key, path)?;
    }
    Ok(())
}

fn validate_holding(value: &Value, path: &str) -> Result<()> {
    let holding = as_object(value, path)?;
    for key in ["id", "name"] {
        require_non_empty_string(holding, key, path)?;
    }
    require_asset_ref(holding, path)?;
    require_number(holding, "amount", path)?;
    for key in ["createdAt", "updatedAt"] {
        require_non_empty_string(holding, key, path)?;
    }

    if holding.contains_key("institutionDetails") {
        let details = require_array(holding, "institutionDetails", path)?;
        for (index, detail) in details.iter().enumerate() {
            let detail_path = format!("{}.institutionDetails[{}]", path, index);
            let detail = as_object(detail, &detail_path)?;
            if !detail.get("institution").is_some_and(Value::is_string) {
                return Err(invalid(&detail_path, "institution must be a string"));
            }
            require_number(detail, "amount", &detail_path)?;
        }
    }
    Ok(())
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| invalid(path, "expected an object"))
}

fn require_array<'a>(object: &'a Map<String, Value>, key: &str, path: &str) -> Result<&'a [Value]> {
    match object.get(key) {
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(_) => Err(invalid(&format!("{}.{}", path, key), "expected an array")),
        None => Err(invalid(&format!("{}.{}", path, key), "missing")),
    }
}

fn require_non_empty_string(object: &Map<String, Value>, key: &str, path: &str) -> Result<()> {
    match object.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Ok(()),
        _ => Err(invalid(
            &format!("{}.{}", path, key),
            "expected a non-empty string",
        )),
    }
}

fn require_number(object: &Map<String, Value>, key: &str, path: &str) -> Result<()> {
    if object.get(key).is_some_and(Value::is_number) {
        Ok(())
    } else {
        Err(invalid(&format!("{}.{}", path, key), "expected a number"))
    }
}

/// Owning asset id, which older writers sometimes stored as a one-element list.
fn require_asset_ref(object: &Map<String, Value>, path: &str) -> Result<()> {
    let valid = match object.get("assetId") {
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => items
            .first()
            .and_then(Value::as_str)
            .is_some_and(|s| !s.is_empty()),
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(invalid(
            &format!("{}.assetId", path),
            "expected a non-empty asset id",
        ))
    }
}

fn invalid(path: &str, reason: &str) -> Error {
    ValidationError::at(path, reason).into()
}
