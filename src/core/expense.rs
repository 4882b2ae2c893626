//! Expense ledger business logic.
//!
//! Real expenses record what was actually paid. Each expense may link back to
//! the budget item it was copied from. The stored `total_price` is always
//! derived from quantity, unit price and the two discounts, and every write
//! recomputes the project's financial summary in the same transaction.

use crate::{
    core::{lookup, money, summary},
    entities::{BudgetItem, ItemCategory, Material, Project, RealExpense, Supplier, real_expense},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Fields a client supplies for an expense. `total_price` is never accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpenseInput {
    /// Owning project
    pub project_id: i64,
    /// Budget line this purchase fulfils; must belong to the same project
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
    #[serde(default)]
    pub spaces: String,
    /// Quantity bought, stored to 3 decimals
    pub quantity: Decimal,
    /// Unit of measure
    pub unit: String,
    /// Price per unit before discounts, stored to cents
    pub unit_price: Decimal,
    /// Percentage taken off first
    #[serde(default)]
    pub discount_percentage: Decimal,
    /// Flat amount taken off after the percentage
    #[serde(default)]
    pub discount_amount: Decimal,
    /// Day of purchase
    pub purchase_date: NaiveDate,
    /// Invoice or receipt number
    #[serde(default)]
    pub invoice_number: String,
    /// How it was paid, e.g. "cash" or "card"
    #[serde(default)]
    pub payment_method: String,
    /// Free-form notes
    #[serde(default)]
    pub notes: String,
}

/// List filters; every field is optional and they combine with AND.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpenseFilter {
    /// Only this project
    pub project_id: Option<i64>,
    /// Only this category
    pub category: Option<ItemCategory>,
    /// Only this supplier
    pub supplier_id: Option<i64>,
    /// Only this material
    pub material_id: Option<i64>,
    /// Only purchases linked to this budget line
    pub budget_item_id: Option<i64>,
    /// Only this payment method
    pub payment_method: Option<String>,
    /// Inclusive lower bound on the purchase date
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on the purchase date
    pub date_to: Option<NaiveDate>,
    /// Substring match on the description
    pub search: Option<String>,
}

/// Discounted total of an expense line.
///
/// The percentage comes off `quantity × unit_price` first, then the flat
/// amount is subtracted, and the result is floored at zero.
#[must_use]
pub fn expense_total(
    quantity: Decimal,
    unit_price: Decimal,
    discount_percentage: Decimal,
    discount_amount: Decimal,
) -> Decimal {
    let base = quantity * unit_price;
    let after_percentage = base - base * discount_percentage / Decimal::ONE_HUNDRED;
    money::round_money((after_percentage - discount_amount).max(Decimal::ZERO))
}

struct Normalized {
    quantity: Decimal,
    unit_price: Decimal,
    discount_percentage: Decimal,
    discount_amount: Decimal,
    total_price: Decimal,
}

fn normalize(input: &ExpenseInput) -> Result<Normalized> {
    if input.description.trim().is_empty() {
        return Err(Error::validation("description cannot be empty"));
    }
    let quantity = money::positive_quantity("quantity", input.quantity)?;
    let unit_price = money::positive_money("unit_price", input.unit_price)?;
    let discount_percentage =
        money::non_negative_money("discount_percentage", input.discount_percentage)?;
    let discount_amount = money::non_negative_money("discount_amount", input.discount_amount)?;

    Ok(Normalized {
        quantity,
        unit_price,
        discount_percentage,
        discount_amount,
        total_price: expense_total(quantity, unit_price, discount_percentage, discount_amount),
    })
}

/// Checks that every referenced row exists and that a linked budget item
/// belongs to the same project.
async fn check_references<C>(db: &C, input: &ExpenseInput) -> Result<()>
where
    C: ConnectionTrait,
{
    lookup::require::<Project, _>(db, "Project", input.project_id).await?;
    let linked =
        lookup::require_optional::<BudgetItem, _>(db, "Budget item", input.budget_item_id).await?;
    if let Some(item) = linked.filter(|item| item.project_id != input.project_id) {
        return Err(Error::validation(format!(
            "Budget item {} belongs to project {}, not {}",
            item.id, item.project_id, input.project_id
        )));
    }
    lookup::require_optional::<Material, _>(db, "Material", input.material_id).await?;
    lookup::require_optional::<Supplier, _>(db, "Supplier", input.supplier_id).await?;
    Ok(())
}

/// Validates and inserts an expense without touching the summary.
///
/// Callers own the transaction and must run [`summary::update_summary`] before
/// committing.
pub(crate) async fn insert_expense<C>(db: &C, input: ExpenseInput) -> Result<real_expense::Model>
where
    C: ConnectionTrait,
{
    let values = normalize(&input)?;
    check_references(db, &input).await?;

    let now = chrono::Utc::now();
    let expense = real_expense::ActiveModel {
        project_id: Set(input.project_id),
        budget_item_id: Set(input.budget_item_id),
        material_id: Set(input.material_id),
        supplier_id: Set(input.supplier_id),
        description: Set(input.description.trim().to_string()),
        category: Set(input.category),
        spaces: Set(input.spaces),
        quantity: Set(values.quantity),
        unit: Set(input.unit),
        unit_price: Set(values.unit_price),
        discount_percentage: Set(values.discount_percentage),
        discount_amount: Set(values.discount_amount),
        total_price: Set(values.total_price),
        purchase_date: Set(input.purchase_date),
        invoice_number: Set(input.invoice_number),
        payment_method: Set(input.payment_method),
        notes: Set(input.notes),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    expense.insert(db).await.map_err(Into::into)
}

/// Records an expense and recomputes the project's summary atomically.
#[instrument(skip(db, input), fields(project_id = input.project_id))]
pub async fn create_expense(
    db: &DatabaseConnection,
    input: ExpenseInput,
) -> Result<real_expense::Model> {
    let txn = db.begin().await?;
    let expense = insert_expense(&txn, input).await?;
    summary::update_summary(&txn, expense.project_id).await?;
    txn.commit().await?;

    info!(
        expense_id = expense.id,
        total_price = %expense.total_price,
        "Expense recorded"
    );
    Ok(expense)
}

/// Retrieves an expense by id.
pub async fn get_expense(db: &DatabaseConnection, expense_id: i64) -> Result<real_expense::Model> {
    lookup::require::<RealExpense, _>(db, "Expense", expense_id).await
}

/// Replaces every client-editable field of an expense.
///
/// When the expense moves to another project both summaries are recomputed.
pub async fn update_expense(
    db: &DatabaseConnection,
    expense_id: i64,
    input: ExpenseInput,
) -> Result<real_expense::Model> {
    let values = normalize(&input)?;

    let txn = db.begin().await?;
    let existing = lookup::require::<RealExpense, _>(&txn, "Expense", expense_id).await?;
    check_references(&txn, &input).await?;

    let old_project_id = existing.project_id;
    let mut expense: real_expense::ActiveModel = existing.into();
    expense.project_id = Set(input.project_id);
    expense.budget_item_id = Set(input.budget_item_id);
    expense.material_id = Set(input.material_id);
    expense.supplier_id = Set(input.supplier_id);
    expense.description = Set(input.description.trim().to_string());
    expense.category = Set(input.category);
    expense.spaces = Set(input.spaces);
    expense.quantity = Set(values.quantity);
    expense.unit = Set(input.unit);
    expense.unit_price = Set(values.unit_price);
    expense.discount_percentage = Set(values.discount_percentage);
    expense.discount_amount = Set(values.discount_amount);
    expense.total_price = Set(values.total_price);
    expense.purchase_date = Set(input.purchase_date);
    expense.invoice_number = Set(input.invoice_number);
    expense.payment_method = Set(input.payment_method);
    expense.notes = Set(input.notes);
    expense.updated_at = Set(chrono::Utc::now());

    let updated = expense.update(&txn).await?;

    summary::update_summary(&txn, updated.project_id).await?;
    if old_project_id != updated.project_id {
        summary::update_summary(&txn, old_project_id).await?;
    }
    txn.commit().await?;

    Ok(updated)
}

/// Deletes an expense and recomputes its project's summary.
pub async fn delete_expense(db: &DatabaseConnection, expense_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let expense = lookup::require::<RealExpense, _>(&txn, "Expense", expense_id).await?;
    let project_id = expense.project_id;

    expense.delete(&txn).await?;
    summary::update_summary(&txn, project_id).await?;
    txn.commit().await?;

    info!(expense_id, project_id, "Expense deleted");
    Ok(())
}

/// Lists expenses matching `filter`, most recent purchase first.
pub async fn list_expenses(
    db: &DatabaseConnection,
    filter: &ExpenseFilter,
) -> Result<Vec<real_expense::Model>> {
    let mut query = RealExpense::find();

    if let Some(project_id) = filter.project_id {
        query = query.filter(real_expense::Column::ProjectId.eq(project_id));
    }
    if let Some(category) = filter.category {
        query = query.filter(real_expense::Column::Category.eq(category));
    }
    if let Some(supplier_id) = filter.supplier_id {
        query = query.filter(real_expense::Column::SupplierId.eq(supplier_id));
    }
    if let Some(material_id) = filter.material_id {
        query = query.filter(real_expense::Column::MaterialId.eq(material_id));
    }
    if let Some(budget_item_id) = filter.budget_item_id {
        query = query.filter(real_expense::Column::BudgetItemId.eq(budget_item_id));
    }
    if let Some(method) = &filter.payment_method {
        query = query.filter(real_expense::Column::PaymentMethod.eq(method.as_str()));
    }
    if let Some(from) = filter.date_from {
        query = query.filter(real_expense::Column::PurchaseDate.gte(from));
    }
    if let Some(to) = filter.date_to {
        query = query.filter(real_expense::Column::PurchaseDate.lte(to));
    }
    if let Some(search) = &filter.search {
        query = query.filter(real_expense::Column::Description.contains(search.as_str()));
    }

    query
        .order_by_desc(real_expense::Column::PurchaseDate)
        .order_by_desc(real_expense::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// An expense with its derived discount and savings figures.
#[derive(Debug, Clone, Serialize)]
pub struct ExpenseDetail {
    /// Stored expense
    #[serde(flatten)]
    pub expense: real_expense::Model,
    /// Undiscounted amount minus the stored total
    pub total_discount: Decimal,
    /// Linked budget total minus this expense; `None` when unlinked
    pub savings_vs_budget: Option<Decimal>,
}

/// Loads an expense together with its derived figures.
pub async fn get_expense_detail(db: &DatabaseConnection, expense_id: i64) -> Result<ExpenseDetail> {
    let expense = get_expense(db, expense_id).await?;
    let budgeted_total = match expense.budget_item_id {
        Some(item_id) => BudgetItem::find_by_id(item_id)
            .one(db)
            .await?
            .map(|item| item.total_price),
        None => None,
    };

    Ok(ExpenseDetail {
        total_discount: money::round_money(expense.total_discount()),
        savings_vs_budget: expense.savings_vs_budget(budgeted_total),
        expense,
    })
}

/// Per-category expense totals for one project.
#[derive(Debug, Clone, Serialize)]
pub struct ExpenseCategoryTotals {
    /// Ledger category
    pub category: ItemCategory,
    /// Sum of expense totals
    pub total_spent: Decimal,
    /// Number of expenses
    pub expenses_count: u64,
    /// Sum of discounts given
    pub total_discount: Decimal,
    /// Mean expense total, zero when there are none
    pub average_expense: Decimal,
}

/// Expense ledger broken down by category.
#[derive(Debug, Clone, Serialize)]
pub struct ExpenseCategorySummary {
    /// Project summarized
    pub project_id: i64,
    /// One entry per category that has expenses
    pub by_category: Vec<ExpenseCategoryTotals>,
    /// Sum over all categories
    pub total_expenses: Decimal,
    /// Number of expenses over all categories
    pub total_expense_items: u64,
}

/// Groups a project's expenses by category, listing every category even when empty.
pub async fn summary_by_category(
    db: &DatabaseConnection,
    project_id: i64,
) -> Result<ExpenseCategorySummary> {
    lookup::require::<Project, _>(db, "Project", project_id).await?;

    let expenses = RealExpense::find()
        .filter(real_expense::Column::ProjectId.eq(project_id))
        .all(db)
        .await?;

    let by_category: Vec<ExpenseCategoryTotals> = ItemCategory::ALL
        .into_iter()
        .map(|category| {
            let in_category = expenses.iter().filter(|e| e.category == category);
            let (total_spent, total_discount, count) = in_category.fold(
                (Decimal::ZERO, Decimal::ZERO, 0u64),
                |(spent, discount, count), e| {
                    (spent + e.total_price, discount + e.total_discount(), count + 1)
                },
            );
            let average_expense = if count > 0 {
                money::round_money(total_spent / Decimal::from(count))
            } else {
                Decimal::ZERO
            };
            ExpenseCategoryTotals {
                category,
                total_spent,
                expenses_count: count,
                total_discount: money::round_money(total_discount),
                average_expense,
            }
        })
        .collect();

    Ok(ExpenseCategorySummary {
        project_id,
        total_expenses: by_category.iter().map(|c| c.total_spent).sum(),
        total_expense_items: by_category.iter().map(|c| c.expenses_count).sum(),
        by_category,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::FinancialSummary;
    use crate::test_utils::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_expense_total_percentage_then_flat() {
        // 10 × 20 = 200, minus 10% = 180, minus 5 = 175
        assert_eq!(expense_total(dec!(10), dec!(20), dec!(10), dec!(5)), dec!(175));
    }

    #[test]
    fn test_expense_total_floors_at_zero() {
        assert_eq!(expense_total(dec!(1), dec!(10), dec!(50), dec!(20)), dec!(0));
    }

    #[test]
    fn test_expense_total_rounds_half_even() {
        // 0.5 × 0.05 = 0.025 -> 0.02
        assert_eq!(expense_total(dec!(0.5), dec!(0.05), dec!(0), dec!(0)), dec!(0.02));
    }

    #[tokio::test]
    async fn test_create_expense_computes_total_and_summary() -> Result<()> {
        let (db, project) = setup_with_project().await?;

        let mut input = expense_input(project.id, ItemCategory::Lighting, dec!(4), dec!(25));
        input.discount_percentage = dec!(10);
        input.discount_amount = dec!(2.5);
        let expense = create_expense(&db, input).await?;

        assert_eq!(expense.total_price, dec!(87.5));
        assert_eq!(expense.total_discount(), dec!(12.5));

        let summary = FinancialSummary::find()
            .filter(crate::entities::financial_summary::Column::ProjectId.eq(project.id))
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(summary.expenses_lighting, dec!(87.5));
        assert_eq!(summary.total_expenses, dec!(87.5));
        assert_eq!(summary.balance, dec!(-87.5));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_expense_rejects_negative_discount() -> Result<()> {
        let (db, project) = setup_with_project().await?;
        let mut input = expense_input(project.id, ItemCategory::Others, dec!(1), dec!(10));
        input.discount_amount = dec!(-1);

        let result = create_expense(&db, input).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert!(RealExpense::find().all(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_expense_rejects_oversized_values() -> Result<()> {
        let (db, project) = setup_with_project().await?;
        let input = expense_input(
            project.id,
            ItemCategory::Construction,
            dec!(100000000000000000000),
            dec!(100000000000000000000),
        );

        let result = create_expense(&db, input).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert!(RealExpense::find().all(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_expense_rejects_budget_item_from_other_project() -> Result<()> {
        let (db, project) = setup_with_project().await?;
        let other = create_test_project(&db, "Other site").await?;
        let item = create_budget_item_with_total(&db, other.id, ItemCategory::Labor, dec!(10))
            .await?;

        let mut input = expense_input(project.id, ItemCategory::Labor, dec!(1), dec!(10));
        input.budget_item_id = Some(item.id);
        let result = create_expense(&db, input).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_expense_moves_between_projects() -> Result<()> {
        let (db, first) = setup_with_project().await?;
        let second = create_test_project(&db, "Second site").await?;
        let expense =
            create_expense_with_total(&db, first.id, ItemCategory::Construction, dec!(40)).await?;

        let input = expense_input(second.id, ItemCategory::Construction, dec!(1), dec!(40));
        update_expense(&db, expense.id, input).await?;

        let first_summary = summary::get_or_create_summary(&db, first.id).await?;
        let second_summary = summary::get_or_create_summary(&db, second.id).await?;
        assert_eq!(first_summary.total_expenses, dec!(0));
        assert_eq!(second_summary.total_expenses, dec!(40));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_expense_updates_summary() -> Result<()> {
        let (db, project) = setup_with_project().await?;
        let expense =
            create_expense_with_total(&db, project.id, ItemCategory::Others, dec!(15)).await?;

        delete_expense(&db, expense.id).await?;

        let summary = summary::get_or_create_summary(&db, project.id).await?;
        assert_eq!(summary.total_expenses, dec!(0));
        assert!(matches!(
            get_expense(&db, expense.id).await,
            Err(Error::NotFound { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_expenses_date_range() -> Result<()> {
        let (db, project) = setup_with_project().await?;
        for day in [1, 10, 20] {
            let mut input = expense_input(project.id, ItemCategory::Others, dec!(1), dec!(5));
            input.purchase_date = NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
            create_expense(&db, input).await?;
        }

        let filter = ExpenseFilter {
            project_id: Some(project.id),
            date_from: NaiveDate::from_ymd_opt(2024, 3, 5),
            date_to: NaiveDate::from_ymd_opt(2024, 3, 20),
            ..Default::default()
        };
        let expenses = list_expenses(&db, &filter).await?;
        assert_eq!(expenses.len(), 2);
        assert_eq!(
            expenses[0].purchase_date,
            NaiveDate::from_ymd_opt(2024, 3, 20).unwrap()
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_expense_detail_savings_vs_budget() -> Result<()> {
        let (db, project) = setup_with_project().await?;
        let item =
            create_budget_item_with_total(&db, project.id, ItemCategory::Lighting, dec!(100))
                .await?;

        let mut input = expense_input(project.id, ItemCategory::Lighting, dec!(1), dec!(100));
        input.budget_item_id = Some(item.id);
        input.discount_percentage = dec!(15);
        let expense = create_expense(&db, input).await?;

        let detail = get_expense_detail(&db, expense.id).await?;
        assert_eq!(detail.expense.total_price, dec!(85));
        assert_eq!(detail.total_discount, dec!(15));
        assert_eq!(detail.savings_vs_budget, Some(dec!(15)));
        Ok(())
    }

    #[tokio::test]
    async fn test_summary_by_category_reports_discounts() -> Result<()> {
        let (db, project) = setup_with_project().await?;
        let mut input = expense_input(project.id, ItemCategory::Construction, dec!(2), dec!(50));
        input.discount_amount = dec!(10);
        create_expense(&db, input).await?;
        create_expense_with_total(&db, project.id, ItemCategory::Construction, dec!(30)).await?;

        let report = summary_by_category(&db, project.id).await?;
        assert_eq!(report.by_category.len(), ItemCategory::ALL.len());

        let construction = &report.by_category[0];
        assert_eq!(construction.category, ItemCategory::Construction);
        assert_eq!(construction.expenses_count, 2);
        assert_eq!(construction.total_spent, dec!(120));
        assert_eq!(construction.total_discount, dec!(10));
        assert_eq!(construction.average_expense, dec!(60));
        assert_eq!(report.total_expenses, dec!(120));
        assert_eq!(report.total_expense_items, 2);
        Ok(())
    }
}
