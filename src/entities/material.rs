//! Material entity - Catalog reference data.
//!
//! Materials carry the reference price and yield figures the calculators and
//! quantity estimates use. Ledger rows only point at a material optionally;
//! deleting a material clears those pointers instead of removing the rows.

use super::enums::MaterialCategory;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Material database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "materials")]
pub struct Model {
    /// Unique identifier for the material
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub name: String,
    /// Unique catalog code (e.g. `"PAINT-LATEX-001"`)
    #[sea_orm(unique)]
    pub code: String,
    /// Catalog grouping
    pub category: MaterialCategory,
    /// Free-form description
    pub description: String,
    /// Unit of sale (e.g. `"liter"`, `"sheet"`, `"roll"`)
    pub unit: String,
    /// How much one unit covers (m² per sack, m per roll, ...)
    pub yield_per_unit: Option<Decimal>,
    /// Typical waste as a fraction (0.05 = 5%)
    pub waste_factor: Decimal,
    /// Typical price per unit, 2 decimal places
    pub reference_price: Option<Decimal>,
    /// When `reference_price` last changed
    pub last_price_update: Option<DateTimeUtc>,
    /// Inactive materials are hidden from calculators and suggestions
    pub is_active: bool,
    /// Paint only: m² covered by one liter
    pub coverage_per_liter: Option<Decimal>,
    /// LED strip only: watts per meter
    pub power_per_meter: Option<Decimal>,
    /// Cable only: gauge designation
    pub wire_gauge: Option<String>,
    /// When the material was created
    pub created_at: DateTimeUtc,
    /// When the material was last saved
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between materials and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Supplier price entries for this material
    #[sea_orm(has_many = "super::supplier_price::Entity")]
    SupplierPrices,
}

impl Related<super::supplier_price::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SupplierPrices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
