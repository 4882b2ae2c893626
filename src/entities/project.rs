//! Project entity - The root aggregate every ledger row belongs to.
//!
//! A project owns its budget items, real expenses, calculations and its
//! financial summary; deleting a project removes all of them.

use super::enums::{ProjectPhase, ProjectStatus, ProjectType};
use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Project database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    /// Unique identifier for the project
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Descriptive project name
    pub name: String,
    /// Client person or company
    pub client: String,
    /// Address or area of the site
    pub location: String,
    /// Kind of building
    pub project_type: ProjectType,
    /// Free-form description
    pub description: String,
    /// Planned start
    pub start_date: Date,
    /// Planned completion date
    pub end_date: Option<Date>,
    /// Set when the project reaches the completed phase
    pub actual_end_date: Option<Date>,
    /// Lifecycle phase
    pub current_phase: ProjectPhase,
    /// Commercial status
    pub status: ProjectStatus,
    /// Link to the shared document folder for the project
    pub document_folder_url: Option<String>,
    /// Rough budget estimate entered at creation, independent of the ledgers
    pub initial_budget: Option<Decimal>,
    /// When the project was created
    pub created_at: DateTimeUtc,
    /// When the project was last saved
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between projects and their ledgers
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Planned lines
    #[sea_orm(has_many = "super::budget_item::Entity")]
    BudgetItems,
    /// Actual purchases
    #[sea_orm(has_many = "super::real_expense::Entity")]
    RealExpenses,
    /// Calculator runs
    #[sea_orm(has_many = "super::calculation::Entity")]
    Calculations,
    /// Cached planned-vs-actual totals
    #[sea_orm(has_one = "super::financial_summary::Entity")]
    FinancialSummary,
}

impl Related<super::budget_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetItems.def()
    }
}

impl Related<super::real_expense::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RealExpenses.def()
    }
}

impl Related<super::calculation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Calculations.def()
    }
}

impl Related<super::financial_summary::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinancialSummary.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Planned duration in days, when an end date is set.
    #[must_use]
    pub fn duration_days(&self) -> Option<i64> {
        self.end_date
            .map(|end| (end - self.start_date).num_days())
    }

    /// True when the planned end date has passed and the project is not completed.
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        match self.end_date {
            Some(end) => self.status != ProjectStatus::Completed && today > end,
            None => false,
        }
    }

    /// Rough completion implied by the current phase.
    #[must_use]
    pub const fn progress_percentage(&self) -> u8 {
        self.current_phase.progress_percentage()
    }
}
