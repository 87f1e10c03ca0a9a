//! Database models for assets and legacy holdings.

use std::str::FromStr;

use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::errors::StorageError;
use stashbook_core::assets::{Asset, InstitutionAllocation};
use stashbook_core::legacy::LegacyHolding;

/// Database model for assets. `institutions` holds the allocations as a JSON array.
#[derive(Queryable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::assets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AssetDB {
    pub id: String,
    pub name: String,
    pub target_ratio: Option<i32>,
    pub institutions: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Database model for holdings (schema version 1).
#[derive(Queryable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::holdings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct HoldingDB {
    pub id: String,
    pub name: String,
    pub code: Option<String>,
    pub asset_id: String,
    pub amount: String,
    pub institution_details: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

// Conversion implementations
impl TryFrom<AssetDB> for Asset {
    type Error = StorageError;

    fn try_from(db: AssetDB) -> Result<Self, Self::Error> {
        let institutions: Vec<InstitutionAllocation> = serde_json::from_str(&db.institutions)?;
        Ok(Asset {
            id: db.id,
            name: db.name,
            target_ratio: db.target_ratio,
            institutions,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl TryFrom<Asset> for AssetDB {
    type Error = StorageError;

    fn try_from(domain: Asset) -> Result<Self, Self::Error> {
        Ok(AssetDB {
            institutions: serde_json::to_string(&domain.institutions)?,
            id: domain.id,
            name: domain.name,
            target_ratio: domain.target_ratio,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        })
    }
}

impl TryFrom<HoldingDB> for LegacyHolding {
    type Error = StorageError;

    fn try_from(db: HoldingDB) -> Result<Self, Self::Error> {
        let amount = Decimal::from_str(&db.amount).map_err(|e| {
            StorageError::SerializationError(format!("holding {} amount: {}", db.id, e))
        })?;
        let institution_details = db
            .institution_details
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;
        Ok(LegacyHolding {
            id: db.id,
            name: db.name,
            code: db.code,
            asset_id: db.asset_id,
            amount,
            institution_details,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl TryFrom<LegacyHolding> for HoldingDB {
    type Error = StorageError;

    fn try_from(domain: LegacyHolding) -> Result<Self, Self::Error> {
        let institution_details = domain
            .institution_details
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        Ok(HoldingDB {
            id: domain.id,
            name: domain.name,
            code: domain.code,
            asset_id: domain.asset_id,
            amount: domain.amount.to_string(),
            institution_details,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn asset_allocations_survive_the_json_column() {
        let asset = Asset {
            id: "a-1".to_string(),
            name: "Cash".to_string(),
            target_ratio: Some(15),
            institutions: vec![InstitutionAllocation {
                institution: "中国银行".to_string(),
                amount: dec!(88.5),
            }],
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
            updated_at: "2024-01-02T00:00:00.000Z".to_string(),
        };

        let row = AssetDB::try_from(asset.clone()).unwrap();
        assert!(row.institutions.contains("中国银行"));
        assert_eq!(Asset::try_from(row).unwrap(), asset);
    }

    #[test]
    fn corrupt_allocation_column_is_reported() {
        let row = AssetDB {
            id: "a-1".to_string(),
            name: "Cash".to_string(),
            target_ratio: None,
            institutions: "not json".to_string(),
            created_at: String::new(),
            updated_at: String::new(),
        };
        assert!(matches!(
            Asset::try_from(row),
            Err(StorageError::SerializationError(_))
        ));
    }

    #[test]
    fn holding_amount_is_stored_as_exact_text() {
        let holding = LegacyHolding {
            id: "h-1".to_string(),
            name: "Deposit".to_string(),
            code: None,
            asset_id: "a-1".to_string(),
            amount: dec!(1234.56),
            institution_details: None,
            created_at: "2023-01-01T00:00:00.000Z".to_string(),
            updated_at: "2023-01-01T00:00:00.000Z".to_string(),
        };

        let row = HoldingDB::try_from(holding.clone()).unwrap();
        assert_eq!(row.amount, "1234.56");
        assert_eq!(LegacyHolding::try_from(row).unwrap(), holding);
    }
}
