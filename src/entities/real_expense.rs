//! Real expense entity - One actual purchase recorded against a project.
//!
//! An expense may point back at the budget item it was copied from, which is
//! what makes the savings-vs-budget comparison possible. `total_price` is the
//! discounted amount and, like the budget ledger, is always recomputed.

use super::enums::ItemCategory;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Real expense database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "real_expenses")]
pub struct Model {
    /// Unique identifier for the expense
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning project
    pub project_id: i64,
    /// Budget line this purchase was copied from, if any
    pub budget_item_id: Option<i64>,
    /// Catalog material, if any
    pub material_id: Option<i64>,
    /// Supplier bought from, if any
    pub supplier_id: Option<i64>,
    /// Purchase description
    pub description: String,
    /// Ledger category
    pub category: ItemCategory,
    /// Rooms or areas the purchase is for
    pub spaces: String,
    /// Quantity bought, 3 decimal places
    pub quantity: Decimal,
    /// Unit of measure
    pub unit: String,
    /// Price per unit before discounts, 2 decimal places
    pub unit_price: Decimal,
    /// Percentage taken off `quantity × unit_price`
    pub discount_percentage: Decimal,
    /// Flat amount subtracted after the percentage discount
    pub discount_amount: Decimal,
    /// Final price after discounts, floored at zero
    pub total_price: Decimal,
    /// Day of purchase
    pub purchase_date: Date,
    /// Invoice or receipt number
    pub invoice_number: String,
    /// Cash, card, transfer, ...
    pub payment_method: String,
    /// Free-form notes
    pub notes: String,
    /// When the expense was recorded
    pub created_at: DateTimeUtc,
    /// When the expense was last saved
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between expenses and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each expense belongs to one project
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id",
        on_delete = "Cascade"
    )]
    Project,
    /// Optional budget line it fulfils
    #[sea_orm(
        belongs_to = "super::budget_item::Entity",
        from = "Column::BudgetItemId",
        to = "super::budget_item::Column::Id",
        on_delete = "SetNull"
    )]
    BudgetItem,
    /// Optional catalog material
    #[sea_orm(
        belongs_to = "super::material::Entity",
        from = "Column::MaterialId",
        to = "super::material::Column::Id",
        on_delete = "SetNull"
    )]
    Material,
    /// Optional supplier
    #[sea_orm(
        belongs_to = "super::supplier::Entity",
        from = "Column::SupplierId",
        to = "super::supplier::Column::Id",
        on_delete = "SetNull"
    )]
    Supplier,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl Related<super::budget_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetItem.def()
    }
}

impl Related<super::material::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Material.def()
    }
}

impl Related<super::supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Amount taken off the undiscounted price.
    #[must_use]
    pub fn total_discount(&self) -> Decimal {
        self.quantity * self.unit_price - self.total_price
    }

    /// Budgeted total minus this expense's total; positive means money saved.
    ///
    /// `budgeted_total` is the linked budget item's `total_price`, `None` when
    /// the expense is not linked.
    #[must_use]
    pub fn savings_vs_budget(&self, budgeted_total: Option<Decimal>) -> Option<Decimal> {
        budgeted_total.map(|budgeted| budgeted - self.total_price)
    }
}
