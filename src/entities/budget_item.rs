//! Budget item entity - One planned line of a project's initial budget.
//!
//! `total_price` is derived: the ledger recomputes it from `quantity` and
//! `unit_price` on every save and never takes it from the caller.

use super::enums::ItemCategory;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Budget item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budget_items")]
pub struct Model {
    /// Unique identifier for the budget item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning project
    pub project_id: i64,
    /// Catalog material, if any
    pub material_id: Option<i64>,
    /// Selected supplier for this line
    pub supplier_id: Option<i64>,
    /// Line description
    pub description: String,
    /// Ledger category
    pub category: ItemCategory,
    /// Rooms or areas the line applies to
    pub spaces: String,
    /// Quantity, 3 decimal places, strictly positive
    pub quantity: Decimal,
    /// Unit of measure
    pub unit: String,
    /// Price per unit, 2 decimal places, strictly positive
    pub unit_price: Decimal,
    /// `round(quantity × unit_price, 2)` at the last save
    pub total_price: Decimal,
    /// Free-form notes
    pub notes: String,
    /// Set when the line was spawned by a calculator result
    pub created_from_calculation: bool,
    /// When the line was created
    pub created_at: DateTimeUtc,
    /// When the line was last saved
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between budget items and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each budget item belongs to one project
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id",
        on_delete = "Cascade"
    )]
    Project,
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
    /// Purchases that fulfil this line
    #[sea_orm(has_many = "super::real_expense::Entity")]
    RelatedExpenses,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
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

impl Related<super::real_expense::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RelatedExpenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
