//! Financial summary entity - Denormalized planned-vs-actual totals per project.
//!
//! The row is a cache of both ledgers grouped into three buckets
//! (construction, lighting, others). It is overwritten in full by
//! `core::summary::update_summary` after every ledger mutation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Financial summary database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project_financial_summaries")]
pub struct Model {
    /// Unique identifier for the summary row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Project summarized; one row per project
    #[sea_orm(unique)]
    pub project_id: i64,
    /// Sum of every budget line
    pub total_budget: Decimal,
    /// Budget lines in the construction category
    pub budget_construction: Decimal,
    /// Budget lines in the lighting category
    pub budget_lighting: Decimal,
    /// Every category other than construction and lighting
    pub budget_others: Decimal,
    /// Sum of every expense
    pub total_expenses: Decimal,
    /// Expenses in the construction category
    pub expenses_construction: Decimal,
    /// Expenses in the lighting category
    pub expenses_lighting: Decimal,
    /// Every category other than construction and lighting
    pub expenses_others: Decimal,
    /// `total_budget - total_expenses`; negative means over budget
    pub balance: Decimal,
    /// When the row was last recomputed
    pub last_updated: DateTimeUtc,
}

/// Defines the relationship to the project
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each summary belongs to one project
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id",
        on_delete = "Cascade"
    )]
    Project,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Share of the budget already spent, in percent. Zero when nothing is budgeted,
    /// saturating at `Decimal::MAX` for a budget too small to divide by.
    #[must_use]
    pub fn budget_utilization_percentage(&self) -> Decimal {
        if self.total_budget <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        self.total_expenses
            .checked_div(self.total_budget)
            .and_then(|share| share.checked_mul(Decimal::ONE_HUNDRED))
            .unwrap_or(Decimal::MAX)
    }

    /// True when more has been spent than planned.
    #[must_use]
    pub fn is_over_budget(&self) -> bool {
        self.balance < Decimal::ZERO
    }

    /// Budget still available, never negative.
    #[must_use]
    pub fn remaining_budget(&self) -> Decimal {
        self.balance.max(Decimal::ZERO)
    }
}
