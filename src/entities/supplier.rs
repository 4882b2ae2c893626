//! Supplier entity - Vendors of materials and services.

use super::enums::SupplierType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Supplier database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "suppliers")]
pub struct Model {
    /// Unique identifier for the supplier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Legal name
    pub name: String,
    /// Trading name when different from the legal one
    pub commercial_name: String,
    /// What the supplier sells
    pub supplier_type: SupplierType,
    /// Who to ask for
    pub contact_person: String,
    /// Contact phone
    pub phone: String,
    /// Contact email
    pub email: String,
    /// Street address
    pub address: String,
    /// City
    pub city: String,
    /// Area within the city
    pub zone: String,
    /// 1 (basic) to 5 (excellent)
    pub rating: i32,
    /// Agreed payment terms
    pub payment_terms: String,
    /// Usual delivery lead time
    pub delivery_time: String,
    /// Smallest order accepted
    pub minimum_order: Option<Decimal>,
    /// Whether the supplier delivers
    pub offers_delivery: bool,
    /// Flat delivery charge per order
    pub delivery_cost: Option<Decimal>,
    /// Free-form notes
    pub notes: String,
    /// Inactive suppliers are left out of comparisons and stats
    pub is_active: bool,
    /// Listed first when quotes tie
    pub is_preferred: bool,
    /// When the supplier was created
    pub created_at: DateTimeUtc,
    /// When the supplier was last saved
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between suppliers and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Price entries offered by this supplier
    #[sea_orm(has_many = "super::supplier_price::Entity")]
    Prices,
}

impl Related<super::supplier_price::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Prices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Commercial name if set, legal name otherwise.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.commercial_name.trim().is_empty() {
            &self.name
        } else {
            &self.commercial_name
        }
    }

    /// Delivery surcharge added to an order, zero when the supplier does not deliver.
    #[must_use]
    pub fn delivery_surcharge(&self) -> Decimal {
        if self.offers_delivery {
            self.delivery_cost.unwrap_or(Decimal::ZERO)
        } else {
            Decimal::ZERO
        }
    }
}
