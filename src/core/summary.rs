//! Financial summary aggregation.
//!
//! The per-project summary is a denormalized snapshot of both ledgers split into
//! three buckets: construction, lighting and others (every remaining category,
//! electrical and labor included). It is never adjusted incrementally:
//! [`update_summary`] re-reads both ledgers and overwrites the stored row, which
//! makes it idempotent and lets a later write repair any earlier race.
//!
//! The bucket arithmetic lives in [`recompute`], a pure function over a ledger
//! snapshot, so it can be tested without a database.

use crate::{
    entities::{
        BudgetItem, FinancialSummary, ItemCategory, Project, RealExpense, budget_item,
        financial_summary, real_expense,
    },
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{Set, TransactionTrait, TryIntoModel, prelude::*};
use serde::Serialize;
use tracing::{debug, instrument};

/// Totals for one ledger split into the three summary buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BucketTotals {
    /// Construction category
    pub construction: Decimal,
    /// Lighting category
    pub lighting: Decimal,
    /// Everything that is neither construction nor lighting
    pub others: Decimal,
}

impl BucketTotals {
    /// Folds `(category, total_price)` pairs into buckets.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (ItemCategory, Decimal)>,
    {
        entries
            .into_iter()
            .fold(Self::default(), |mut totals, (category, amount)| {
                match category {
                    ItemCategory::Construction => totals.construction += amount,
                    ItemCategory::Lighting => totals.lighting += amount,
                    ItemCategory::Electrical | ItemCategory::Labor | ItemCategory::Others => {
                        totals.others += amount;
                    }
                }
                totals
            })
    }

    /// Sum of the three buckets.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.construction + self.lighting + self.others
    }
}

/// Result of a full recompute: planned and actual buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummarySnapshot {
    /// Planned lines
    pub budget: BucketTotals,
    /// Actual purchases
    pub expenses: BucketTotals,
}

impl SummarySnapshot {
    /// Sum of all planned lines.
    #[must_use]
    pub fn total_budget(&self) -> Decimal {
        self.budget.total()
    }

    /// Sum of all purchases.
    #[must_use]
    pub fn total_expenses(&self) -> Decimal {
        self.expenses.total()
    }

    /// Planned minus spent; negative when over budget.
    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.total_budget() - self.total_expenses()
    }
}

/// Aggregates a snapshot of both ledgers.
///
/// Each argument yields `(category, total_price)` for every row of one ledger.
pub fn recompute<B, E>(budget: B, expenses: E) -> SummarySnapshot
where
    B: IntoIterator<Item = (ItemCategory, Decimal)>,
    E: IntoIterator<Item = (ItemCategory, Decimal)>,
{
    SummarySnapshot {
        budget: BucketTotals::from_entries(budget),
        expenses: BucketTotals::from_entries(expenses),
    }
}

/// Reads both ledgers of a project and computes its snapshot.
pub async fn snapshot_for_project<C>(db: &C, project_id: i64) -> Result<SummarySnapshot>
where
    C: ConnectionTrait,
{
    let items = BudgetItem::find()
        .filter(budget_item::Column::ProjectId.eq(project_id))
        .all(db)
        .await?;
    let expenses = RealExpense::find()
        .filter(real_expense::Column::ProjectId.eq(project_id))
        .all(db)
        .await?;

    Ok(recompute(
        items.iter().map(|i| (i.category, i.total_price)),
        expenses.iter().map(|e| (e.category, e.total_price)),
    ))
}

/// Recomputes a project's summary from its ledgers and overwrites the stored row,
/// creating it on first use.
///
/// Callers that mutate a ledger run this on the same transaction as the write, so
/// a failed recompute rolls the write back.
#[instrument(skip(db))]
pub async fn update_summary<C>(db: &C, project_id: i64) -> Result<financial_summary::Model>
where
    C: ConnectionTrait,
{
    let snapshot = snapshot_for_project(db, project_id).await?;
    let now = chrono::Utc::now();

    let existing = FinancialSummary::find()
        .filter(financial_summary::Column::ProjectId.eq(project_id))
        .one(db)
        .await?;

    let mut model = match existing {
        Some(summary) => summary.into(),
        None => financial_summary::ActiveModel {
            project_id: Set(project_id),
            ..Default::default()
        },
    };
    model.budget_construction = Set(snapshot.budget.construction);
    model.budget_lighting = Set(snapshot.budget.lighting);
    model.budget_others = Set(snapshot.budget.others);
    model.total_budget = Set(snapshot.total_budget());
    model.expenses_construction = Set(snapshot.expenses.construction);
    model.expenses_lighting = Set(snapshot.expenses.lighting);
    model.expenses_others = Set(snapshot.expenses.others);
    model.total_expenses = Set(snapshot.total_expenses());
    model.balance = Set(snapshot.balance());
    model.last_updated = Set(now);

    let summary = model.save(db).await?.try_into_model()?;
    debug!(
        project_id,
        total_budget = %summary.total_budget,
        total_expenses = %summary.total_expenses,
        "Financial summary recomputed"
    );
    Ok(summary)
}

/// Returns the project's summary, creating an all-zero row if none exists yet.
///
/// # Errors
/// Returns `Error::NotFound` if the project does not exist.
pub async fn get_or_create_summary<C>(db: &C, project_id: i64) -> Result<financial_summary::Model>
where
    C: ConnectionTrait,
{
    Project::find_by_id(project_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Project", project_id))?;

    if let Some(summary) = FinancialSummary::find()
        .filter(financial_summary::Column::ProjectId.eq(project_id))
        .one(db)
        .await?
    {
        return Ok(summary);
    }

    let summary = financial_summary::ActiveModel {
        project_id: Set(project_id),
        total_budget: Set(Decimal::ZERO),
        budget_construction: Set(Decimal::ZERO),
        budget_lighting: Set(Decimal::ZERO),
        budget_others: Set(Decimal::ZERO),
        total_expenses: Set(Decimal::ZERO),
        expenses_construction: Set(Decimal::ZERO),
        expenses_lighting: Set(Decimal::ZERO),
        expenses_others: Set(Decimal::ZERO),
        balance: Set(Decimal::ZERO),
        last_updated: Set(chrono::Utc::now()),
        ..Default::default()
    };
    summary.insert(db).await.map_err(Into::into)
}

/// Forces a recompute of one project's summary in its own transaction.
pub async fn refresh_summary(
    db: &DatabaseConnection,
    project_id: i64,
) -> Result<financial_summary::Model> {
    let txn = db.begin().await?;

    Project::find_by_id(project_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Project", project_id))?;

    let summary = update_summary(&txn, project_id).await?;
    txn.commit().await?;
    Ok(summary)
}

/// Summary row plus the metrics derived from it, as served to clients.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    /// Stored totals
    #[serde(flatten)]
    pub summary: financial_summary::Model,
    /// Spent as a share of the budget, in percent
    pub budget_utilization_percentage: Decimal,
    /// Spent more than planned
    pub is_over_budget: bool,
    /// Budget left, never negative
    pub remaining_budget: Decimal,
}

impl From<financial_summary::Model> for SummaryReport {
    fn from(summary: financial_summary::Model) -> Self {
        Self {
            budget_utilization_percentage: crate::core::money::round_money(
                summary.budget_utilization_percentage(),
            ),
            is_over_budget: summary.is_over_budget(),
            remaining_budget: summary.remaining_budget(),
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_recompute_buckets_categories() {
        let snapshot = recompute(
            [
                (ItemCategory::Construction, dec!(100)),
                (ItemCategory::Lighting, dec!(50)),
                (ItemCategory::Electrical, dec!(20)),
                (ItemCategory::Labor, dec!(30)),
                (ItemCategory::Others, dec!(5)),
            ],
            [(ItemCategory::Construction, dec!(80))],
        );

        assert_eq!(snapshot.budget.construction, dec!(100));
        assert_eq!(snapshot.budget.lighting, dec!(50));
        assert_eq!(snapshot.budget.others, dec!(55));
        assert_eq!(snapshot.total_budget(), dec!(205));
        assert_eq!(snapshot.total_expenses(), dec!(80));
        assert_eq!(snapshot.balance(), dec!(125));
    }

    #[test]
    fn test_recompute_empty_ledgers() {
        let snapshot = recompute([], []);
        assert_eq!(snapshot, SummarySnapshot::default());
        assert_eq!(snapshot.balance(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_update_summary_scenario() -> Result<()> {
        let (db, project) = setup_with_project().await?;
        create_budget_item_with_total(&db, project.id, ItemCategory::Construction, dec!(100))
            .await?;
        create_budget_item_with_total(&db, project.id, ItemCategory::Lighting, dec!(50)).await?;
        create_expense_with_total(&db, project.id, ItemCategory::Construction, dec!(80)).await?;

        let summary = update_summary(&db, project.id).await?;

        assert_eq!(summary.budget_construction, dec!(100));
        assert_eq!(summary.budget_lighting, dec!(50));
        assert_eq!(summary.budget_others, dec!(0));
        assert_eq!(summary.total_budget, dec!(150));
        assert_eq!(summary.expenses_construction, dec!(80));
        assert_eq!(summary.total_expenses, dec!(80));
        assert_eq!(summary.balance, dec!(70));
        assert!(!summary.is_over_budget());
        assert_eq!(summary.remaining_budget(), dec!(70));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_summary_is_idempotent() -> Result<()> {
        let (db, project) = setup_with_project().await?;
        create_budget_item_with_total(&db, project.id, ItemCategory::Labor, dec!(42.5)).await?;
        create_expense_with_total(&db, project.id, ItemCategory::Lighting, dec!(12.25)).await?;

        let first = update_summary(&db, project.id).await?;
        let second = update_summary(&db, project.id).await?;

        assert_eq!(first.id, second.id);
        assert_eq!(first.total_budget, second.total_budget);
        assert_eq!(first.budget_others, second.budget_others);
        assert_eq!(first.total_expenses, second.total_expenses);
        assert_eq!(first.expenses_lighting, second.expenses_lighting);
        assert_eq!(first.balance, second.balance);

        let rows = FinancialSummary::find().all(&db).await?;
        assert_eq!(rows.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_get_or_create_summary_starts_at_zero() -> Result<()> {
        let (db, project) = setup_with_project().await?;

        let summary = get_or_create_summary(&db, project.id).await?;
        assert_eq!(summary.total_budget, Decimal::ZERO);
        assert_eq!(summary.total_expenses, Decimal::ZERO);
        assert_eq!(summary.balance, Decimal::ZERO);

        let again = get_or_create_summary(&db, project.id).await?;
        assert_eq!(summary.id, again.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_get_or_create_summary_unknown_project() -> Result<()> {
        let db = setup_test_db().await?;
        let result = get_or_create_summary(&db, 999).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[test]
    fn test_report_derived_metrics() {
        let model = financial_summary::Model {
            id: 1,
            project_id: 1,
            total_budget: dec!(200),
            budget_construction: dec!(200),
            budget_lighting: dec!(0),
            budget_others: dec!(0),
            total_expenses: dec!(250),
            expenses_construction: dec!(250),
            expenses_lighting: dec!(0),
            expenses_others: dec!(0),
            balance: dec!(-50),
            last_updated: chrono::Utc::now(),
        };
        let report = SummaryReport::from(model);
        assert_eq!(report.budget_utilization_percentage, dec!(125));
        assert!(report.is_over_budget);
        assert_eq!(report.remaining_budget, Decimal::ZERO);
    }

    #[test]
    fn test_utilization_is_zero_without_budget() {
        let model = financial_summary::Model {
            id: 1,
            project_id: 1,
            total_budget: dec!(0),
            budget_construction: dec!(0),
            budget_lighting: dec!(0),
            budget_others: dec!(0),
            total_expenses: dec!(30),
            expenses_construction: dec!(0),
            expenses_lighting: dec!(0),
            expenses_others: dec!(30),
            balance: dec!(-30),
            last_updated: chrono::Utc::now(),
        };
        assert_eq!(model.budget_utilization_percentage(), Decimal::ZERO);
    }

    #[test]
    fn test_utilization_saturates_instead_of_overflowing() {
        let model = financial_summary::Model {
            id: 1,
            project_id: 1,
            total_budget: dec!(0.0000000000000000000000000001),
            budget_construction: dec!(0),
            budget_lighting: dec!(0),
            budget_others: dec!(0),
            total_expenses: dec!(99999999999999),
            expenses_construction: dec!(99999999999999),
            expenses_lighting: dec!(0),
            expenses_others: dec!(0),
            balance: dec!(-99999999999999),
            last_updated: chrono::Utc::now(),
        };
        assert_eq!(model.budget_utilization_percentage(), Decimal::MAX);
    }
}
