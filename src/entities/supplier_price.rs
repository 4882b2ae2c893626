//! Supplier price entity - One price-book entry per supplier and material.
//!
//! An entry carries a flat discount and an optional bulk discount. The bulk
//! discount replaces the flat one once the ordered quantity reaches the
//! threshold; the two never stack.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Supplier price database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "supplier_prices")]
pub struct Model {
    /// Unique identifier for the price entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Supplier offering the price
    pub supplier_id: i64,
    /// Material priced
    pub material_id: i64,
    /// List price per material unit
    pub price: Decimal,
    /// ISO currency code
    pub currency: String,
    /// Flat discount in percent
    pub discount_percentage: Decimal,
    /// Quantity from which the bulk discount applies
    pub bulk_discount_threshold: Option<Decimal>,
    /// Bulk discount in percent, replaces the flat one
    pub bulk_discount_percentage: Option<Decimal>,
    /// First day the price holds
    pub valid_from: Date,
    /// Last day the price holds, if limited
    pub valid_until: Option<Date>,
    /// Only current entries take part in price comparisons
    pub is_current: bool,
    /// When the entry was created
    pub created_at: DateTimeUtc,
    /// When the entry was last saved
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between price entries and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each entry belongs to one supplier
    #[sea_orm(
        belongs_to = "super::supplier::Entity",
        from = "Column::SupplierId",
        to = "super::supplier::Column::Id",
        on_delete = "Cascade"
    )]
    Supplier,
    /// Each entry prices one material
    #[sea_orm(
        belongs_to = "super::material::Entity",
        from = "Column::MaterialId",
        to = "super::material::Column::Id",
        on_delete = "Cascade"
    )]
    Material,
}

impl Related<super::supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl Related<super::material::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Material.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether the bulk discount applies to an order of `quantity` units.
    #[must_use]
    pub fn bulk_applies(&self, quantity: Decimal) -> bool {
        match (self.bulk_discount_threshold, self.bulk_discount_percentage) {
            (Some(threshold), Some(pct)) => pct > Decimal::ZERO && quantity >= threshold,
            _ => false,
        }
    }

    /// Discount percentage in effect for an order of `quantity` units.
    #[must_use]
    pub fn effective_discount_percentage(&self, quantity: Decimal) -> Decimal {
        if self.bulk_applies(quantity) {
            self.bulk_discount_percentage.unwrap_or(Decimal::ZERO)
        } else {
            self.discount_percentage
        }
    }

    /// Unit price after the discount in effect for `quantity` units.
    #[must_use]
    pub fn unit_price_for(&self, quantity: Decimal) -> Decimal {
        let pct = self.effective_discount_percentage(quantity);
        self.price - self.price * pct / Decimal::ONE_HUNDRED
    }
}
