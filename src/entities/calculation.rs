//! Calculation entity - A persisted calculator run.
//!
//! The header row stores the generic result (quantity, unit, cost, free-form
//! details). Paint, gypsum, LED strip and cable runs also get a one-to-one
//! detail row in their own table. Once a calculation has been turned into a
//! budget item the link is permanent.

use super::enums::CalculatorKind;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Calculation database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "calculations")]
pub struct Model {
    /// Unique identifier for the calculation
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Project the run belongs to
    pub project_id: i64,
    /// Calculator used
    pub kind: CalculatorKind,
    /// Main material priced by this run
    pub material_id: Option<i64>,
    /// Calculator inputs as received
    pub input_data: Json,
    /// Quantity to purchase, 3 decimal places
    pub calculated_quantity: Decimal,
    /// Unit of the quantity
    pub unit: String,
    /// Cost from the material's reference price, 2 decimal places
    pub estimated_cost: Option<Decimal>,
    /// Intermediate figures and secondary materials
    pub detailed_results: Json,
    /// Set once the run has been turned into a budget line
    pub added_to_budget: bool,
    /// Budget item spawned from this run
    pub budget_item_id: Option<i64>,
    /// When the run was made
    pub created_at: DateTimeUtc,
}

/// Defines relationships between calculations and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each calculation belongs to one project
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id",
        on_delete = "Cascade"
    )]
    Project,
    /// Optional priced material
    #[sea_orm(
        belongs_to = "super::material::Entity",
        from = "Column::MaterialId",
        to = "super::material::Column::Id",
        on_delete = "SetNull"
    )]
    Material,
    /// Budget line spawned from the run
    #[sea_orm(
        belongs_to = "super::budget_item::Entity",
        from = "Column::BudgetItemId",
        to = "super::budget_item::Column::Id",
        on_delete = "SetNull"
    )]
    BudgetItem,
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

impl Related<super::budget_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
