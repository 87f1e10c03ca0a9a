//! Asset domain models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::MAX_TARGET_RATIO;
use crate::errors::{Result, ValidationError};
use crate::utils::time_utils::{now_iso, refreshed_timestamp};

/// A named sub-amount of an asset held at one institution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstitutionAllocation {
    pub institution: String,
    pub amount: Decimal,
}

/// Domain model representing an asset bucket with its allocations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_ratio: Option<i32>,
    #[serde(default)]
    pub institutions: Vec<InstitutionAllocation>,
    pub created_at: String,
    pub updated_at: String,
}

impl Asset {
    /// Sum of this asset's allocation amounts.
    pub fn total_value(&self) -> Decimal {
        self.institutions.iter().map(|i| i.amount).sum()
    }

    /// Applies a partial update and refreshes `updated_at`.
    pub fn apply_update(&self, update: AssetUpdate) -> Asset {
        Asset {
            id: self.id.clone(),
            name: update
                .name
                .map(|name| name.trim().to_string())
                .unwrap_or_else(|| self.name.clone()),
            target_ratio: update.target_ratio.unwrap_or(self.target_ratio),
            institutions: update
                .institutions
                .unwrap_or_else(|| self.institutions.clone()),
            created_at: self.created_at.clone(),
            updated_at: refreshed_timestamp(&self.created_at),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        validate_target_ratio(self.target_ratio)?;
        validate_allocations(&self.institutions)
    }
}

/// Input model for creating a new asset. Id and timestamps are assigned on insert.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewAsset {
    pub name: String,
    pub target_ratio: Option<i32>,
    #[serde(default)]
    pub institutions: Vec<InstitutionAllocation>,
}

impl NewAsset {
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        validate_target_ratio(self.target_ratio)?;
        validate_allocations(&self.institutions)
    }

    /// Builds the stored record with a fresh id and matching timestamps.
    pub fn into_asset(self) -> Asset {
        let now = now_iso();
        Asset {
            id: Uuid::new_v4().to_string(),
            name: self.name.trim().to_string(),
            target_ratio: self.target_ratio,
            institutions: self.institutions,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Partial update for an existing asset. `None` fields are left unchanged.
///
/// `target_ratio` distinguishes an absent key (`None`) from an explicit
/// `null` (`Some(None)`), which clears the ratio.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct AssetUpdate {
    pub name: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub target_ratio: Option<Option<i32>>,
    pub institutions: Option<Vec<InstitutionAllocation>>,
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::MissingField("name".to_string()).into());
    }
    Ok(())
}

fn validate_target_ratio(target_ratio: Option<i32>) -> Result<()> {
    match target_ratio {
        Some(ratio) if !(0..=MAX_TARGET_RATIO).contains(&ratio) => {
            Err(ValidationError::InvalidInput(format!(
                "targetRatio must be between 0 and {}, got {}",
                MAX_TARGET_RATIO, ratio
            ))
            .into())
        }
        _ => Ok(()),
    }
}

fn validate_allocations(institutions: &[InstitutionAllocation]) -> Result<()> {
    for (index, allocation) in institutions.iter().enumerate() {
        if allocation.amount.is_sign_negative() && !allocation.amount.is_zero() {
            return Err(ValidationError::InvalidInput(format!(
                "institutions[{}].amount must not be negative, got {}",
                index, allocation.amount
            ))
            .into());
        }
    }
    Ok(())
}
