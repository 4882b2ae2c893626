//! Budget ledger business logic.
//!
//! Budget items are the planned lines of a project. Every create, update and
//! delete runs in a single database transaction together with the financial
//! summary recompute of each affected project, so the summary never disagrees
//! with the ledger it was derived from.
//!
//! A budget item can be copied into the expense ledger. Copying builds an
//! unsaved [`ExpenseDraft`] that the caller completes with a purchase date and
//! optional discounts; the source item is never modified.

use crate::{
    core::{
        expense::{self, ExpenseInput},
        lookup, money, summary,
    },
    entities::{
        BudgetItem, Calculation, ItemCategory, Material, Project, RealExpense, Supplier,
        budget_item, calculation, real_expense,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// Fields a client supplies for a budget item. `total_price` is never accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct BudgetItemInput {
    /// Owning project
    pub project_id: i64,
    /// Catalog material, if any
    pub material_id: Option<i64>,
    /// Intended supplier, if any
    pub supplier_id: Option<i64>,
    /// Line description
    pub description: String,
    /// Ledger category
    pub category: ItemCategory,
    /// Rooms or areas the line applies to
    #[serde(default)]
    pub spaces: String,
    /// Planned quantity, stored to 3 decimals
    pub quantity: Decimal,
    /// Unit of measure
    pub unit: String,
    /// Planned price per unit, stored to cents
    pub unit_price: Decimal,
    /// Free-form notes
    #[serde(default)]
    pub notes: String,
}

/// List filters; every field is optional and they combine with AND.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BudgetItemFilter {
    /// Only this project
    pub project_id: Option<i64>,
    /// Only this category
    pub category: Option<ItemCategory>,
    /// Only this supplier
    pub supplier_id: Option<i64>,
    /// Only this material
    pub material_id: Option<i64>,
    /// Only lines that did or did not come from a calculator
    pub created_from_calculation: Option<bool>,
    /// Inclusive lower bound on `total_price`
    pub min_price: Option<Decimal>,
    /// Inclusive upper bound on `total_price`
    pub max_price: Option<Decimal>,
    /// Substring match on the description
    pub search: Option<String>,
}

/// `round(quantity × unit_price, 2)`
#[must_use]
pub fn line_total(quantity: Decimal, unit_price: Decimal) -> Decimal {
    money::round_money(quantity * unit_price)
}

fn normalize(input: &BudgetItemInput) -> Result<(Decimal, Decimal)> {
    if input.description.trim().is_empty() {
        return Err(Error::validation("description cannot be empty"));
    }
    let quantity = money::positive_quantity("quantity", input.quantity)?;
    let unit_price = money::positive_money("unit_price", input.unit_price)?;
    Ok((quantity, unit_price))
}

async fn check_references<C>(db: &C, input: &BudgetItemInput) -> Result<()>
where
    C: ConnectionTrait,
{
    lookup::require::<Project, _>(db, "Project", input.project_id).await?;
    lookup::require_optional::<Material, _>(db, "Material", input.material_id).await?;
    lookup::require_optional::<Supplier, _>(db, "Supplier", input.supplier_id).await?;
    Ok(())
}

/// Validates and inserts a budget item without touching the summary.
///
/// Callers own the transaction and must run [`summary::update_summary`] before
/// committing.
pub(crate) async fn insert_budget_item<C>(
    db: &C,
    input: BudgetItemInput,
    created_from_calculation: bool,
) -> Result<budget_item::Model>
where
    C: ConnectionTrait,
{
    let (quantity, unit_price) = normalize(&input)?;
    check_references(db, &input).await?;

    let now = chrono::Utc::now();
    let item = budget_item::ActiveModel {
        project_id: Set(input.project_id),
        material_id: Set(input.material_id),
        supplier_id: Set(input.supplier_id),
        description: Set(input.description.trim().to_string()),
        category: Set(input.category),
        spaces: Set(input.spaces),
        quantity: Set(quantity),
        unit: Set(input.unit),
        unit_price: Set(unit_price),
        total_price: Set(line_total(quantity, unit_price)),
        notes: Set(input.notes),
        created_from_calculation: Set(created_from_calculation),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    item.insert(db).await.map_err(Into::into)
}

/// Adds a line to a project's budget and recomputes the summary atomically.
#[instrument(skip(db, input), fields(project_id = input.project_id))]
pub async fn create_budget_item(
    db: &DatabaseConnection,
    input: BudgetItemInput,
) -> Result<budget_item::Model> {
    let txn = db.begin().await?;
    let item = insert_budget_item(&txn, input, false).await?;
    summary::update_summary(&txn, item.project_id).await?;
    txn.commit().await?;

    info!(
        budget_item_id = item.id,
        total_price = %item.total_price,
        "Budget item created"
    );
    Ok(item)
}

/// Retrieves a budget item by id.
pub async fn get_budget_item(db: &DatabaseConnection, item_id: i64) -> Result<budget_item::Model> {
    lookup::require::<BudgetItem, _>(db, "Budget item", item_id).await
}

/// Replaces every client-editable field of a budget item.
///
/// When the item moves to another project both summaries are recomputed in the
/// same transaction.
pub async fn update_budget_item(
    db: &DatabaseConnection,
    item_id: i64,
    input: BudgetItemInput,
) -> Result<budget_item::Model> {
    let (quantity, unit_price) = normalize(&input)?;

    let txn = db.begin().await?;
    let existing = lookup::require::<BudgetItem, _>(&txn, "Budget item", item_id).await?;
    check_references(&txn, &input).await?;

    let old_project_id = existing.project_id;
    let mut item: budget_item::ActiveModel = existing.into();
    item.project_id = Set(input.project_id);
    item.material_id = Set(input.material_id);
    item.supplier_id = Set(input.supplier_id);
    item.description = Set(input.description.trim().to_string());
    item.category = Set(input.category);
    item.spaces = Set(input.spaces);
    item.quantity = Set(quantity);
    item.unit = Set(input.unit);
    item.unit_price = Set(unit_price);
    item.total_price = Set(line_total(quantity, unit_price));
    item.notes = Set(input.notes);
    item.updated_at = Set(chrono::Utc::now());

    let updated = item.update(&txn).await?;

    summary::update_summary(&txn, updated.project_id).await?;
    if old_project_id != updated.project_id {
        summary::update_summary(&txn, old_project_id).await?;
    }
    txn.commit().await?;

    Ok(updated)
}

/// Deletes a budget item.
///
/// Expenses and calculations linked to the item keep existing with their link
/// cleared.
pub async fn delete_budget_item(db: &DatabaseConnection, item_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let item = lookup::require::<BudgetItem, _>(&txn, "Budget item", item_id).await?;
    let project_id = item.project_id;

    RealExpense::update_many()
        .col_expr(
            real_expense::Column::BudgetItemId,
            Expr::value(Option::<i64>::None),
        )
        .filter(real_expense::Column::BudgetItemId.eq(item_id))
        .exec(&txn)
        .await?;
    Calculation::update_many()
        .col_expr(
            calculation::Column::BudgetItemId,
            Expr::value(Option::<i64>::None),
        )
        .filter(calculation::Column::BudgetItemId.eq(item_id))
        .exec(&txn)
        .await?;

    item.delete(&txn).await?;
    summary::update_summary(&txn, project_id).await?;
    txn.commit().await?;

    info!(budget_item_id = item_id, project_id, "Budget item deleted");
    Ok(())
}

/// Lists budget items matching `filter`, ordered by category then description.
pub async fn list_budget_items(
    db: &DatabaseConnection,
    filter: &BudgetItemFilter,
) -> Result<Vec<budget_item::Model>> {
    let mut query = BudgetItem::find();

    if let Some(project_id) = filter.project_id {
        query = query.filter(budget_item::Column::ProjectId.eq(project_id));
    }
    if let Some(category) = filter.category {
        query = query.filter(budget_item::Column::Category.eq(category));
    }
    if let Some(supplier_id) = filter.supplier_id {
        query = query.filter(budget_item::Column::SupplierId.eq(supplier_id));
    }
    if let Some(material_id) = filter.material_id {
        query = query.filter(budget_item::Column::MaterialId.eq(material_id));
    }
    if let Some(flag) = filter.created_from_calculation {
        query = query.filter(budget_item::Column::CreatedFromCalculation.eq(flag));
    }
    if let Some(min) = filter.min_price {
        query = query.filter(budget_item::Column::TotalPrice.gte(min));
    }
    if let Some(max) = filter.max_price {
        query = query.filter(budget_item::Column::TotalPrice.lte(max));
    }
    if let Some(search) = &filter.search {
        query = query.filter(budget_item::Column::Description.contains(search.as_str()));
    }

    query
        .order_by_asc(budget_item::Column::Category)
        .order_by_asc(budget_item::Column::Description)
        .order_by_asc(budget_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// An unsaved expense built from a budget item.
///
/// It carries everything the item knows; the purchase date and discounts are
/// only known at purchase time and are supplied through [`CopyOptions`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    /// Project of the source item
    pub project_id: i64,
    /// Source budget item
    pub budget_item_id: i64,
    /// Material of the source item
    pub material_id: Option<i64>,
    /// Supplier of the source item
    pub supplier_id: Option<i64>,
    /// Copied description
    pub description: String,
    /// Copied category
    pub category: ItemCategory,
    /// Copied spaces
    pub spaces: String,
    /// Copied quantity
    pub quantity: Decimal,
    /// Copied unit
    pub unit: String,
    /// Copied unit price
    pub unit_price: Decimal,
    /// Note pointing back at the source item
    pub notes: String,
}

/// What the buyer adds when a budget line becomes a purchase.
#[derive(Debug, Clone, Deserialize)]
pub struct CopyOptions {
    /// Day of purchase
    pub purchase_date: NaiveDate,
    /// Percentage discount on the purchase
    #[serde(default)]
    pub discount_percentage: Decimal,
    /// Flat discount on the purchase
    #[serde(default)]
    pub discount_amount: Decimal,
    /// Replaces the item's supplier when set
    pub supplier_id: Option<i64>,
    /// Replaces the generated note when set and non-empty
    pub notes: Option<String>,
}

impl CopyOptions {
    /// Options with only a purchase date.
    #[must_use]
    pub const fn on(purchase_date: NaiveDate) -> Self {
        Self {
            purchase_date,
            discount_percentage: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            supplier_id: None,
            notes: None,
        }
    }
}

/// Builds an unsaved expense from a budget item.
#[must_use]
pub fn copy_to_expense(item: &budget_item::Model) -> ExpenseDraft {
    ExpenseDraft {
        project_id: item.project_id,
        budget_item_id: item.id,
        material_id: item.material_id,
        supplier_id: item.supplier_id,
        description: item.description.clone(),
        category: item.category,
        spaces: item.spaces.clone(),
        quantity: item.quantity,
        unit: item.unit.clone(),
        unit_price: item.unit_price,
        notes: format!("Copied from budget: {}", item.description),
    }
}

impl ExpenseDraft {
    /// Completes the draft into an expense ready to be persisted.
    #[must_use]
    pub fn complete(self, options: CopyOptions) -> ExpenseInput {
        let notes = options
            .notes
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(self.notes);

        ExpenseInput {
            project_id: self.project_id,
            budget_item_id: Some(self.budget_item_id),
            material_id: self.material_id,
            supplier_id: options.supplier_id.or(self.supplier_id),
            description: self.description,
            category: self.category,
            spaces: self.spaces,
            quantity: self.quantity,
            unit: self.unit,
            unit_price: self.unit_price,
            discount_percentage: options.discount_percentage,
            discount_amount: options.discount_amount,
            purchase_date: options.purchase_date,
            invoice_number: String::new(),
            payment_method: String::new(),
            notes,
        }
    }
}

/// Copies one budget item into the expense ledger and recomputes the summary.
#[instrument(skip(db, options))]
pub async fn copy_item_to_expense(
    db: &DatabaseConnection,
    item_id: i64,
    options: CopyOptions,
) -> Result<real_expense::Model> {
    let txn = db.begin().await?;
    let item = lookup::require::<BudgetItem, _>(&txn, "Budget item", item_id).await?;

    let input = copy_to_expense(&item).complete(options);
    let expense = expense::insert_expense(&txn, input).await?;
    summary::update_summary(&txn, expense.project_id).await?;
    txn.commit().await?;

    info!(
        budget_item_id = item_id,
        expense_id = expense.id,
        "Budget item copied to expenses"
    );
    Ok(expense)
}

/// Request to copy several budget items at once.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchCopyRequest {
    /// Items to copy, in order
    pub budget_item_ids: Vec<i64>,
    /// Day of purchase for every copy
    pub purchase_date: NaiveDate,
    /// Supplier applied to every copy instead of the item's own
    pub default_supplier_id: Option<i64>,
}

/// Result of a batch copy: the expenses created and the items that failed.
#[derive(Debug, Default)]
pub struct BatchCopyOutcome {
    /// Expenses written, in request order
    pub created: Vec<real_expense::Model>,
    /// Item ids that could not be copied, with the reason
    pub failures: Vec<(i64, Error)>,
}

/// Copies several budget items, each in its own transaction.
///
/// A failing item does not abort the batch; it is reported in
/// [`BatchCopyOutcome::failures`] with its error.
pub async fn copy_multiple_to_expenses(
    db: &DatabaseConnection,
    request: BatchCopyRequest,
) -> Result<BatchCopyOutcome> {
    if request.budget_item_ids.is_empty() {
        return Err(Error::validation("budget_item_ids cannot be empty"));
    }

    let mut outcome = BatchCopyOutcome::default();
    for item_id in request.budget_item_ids {
        let options = CopyOptions {
            supplier_id: request.default_supplier_id,
            notes: Some("Copied automatically from budget".to_string()),
            ..CopyOptions::on(request.purchase_date)
        };
        match copy_item_to_expense(db, item_id, options).await {
            Ok(expense) => outcome.created.push(expense),
            Err(e) => {
                warn!(budget_item_id = item_id, error = %e, "Failed to copy budget item");
                outcome.failures.push((item_id, e));
            }
        }
    }

    info!(
        created = outcome.created.len(),
        failed = outcome.failures.len(),
        "Batch copy to expenses finished"
    );
    Ok(outcome)
}

/// Per-category budget totals for one project.
#[derive(Debug, Clone, Serialize)]
pub struct BudgetCategoryTotals {
    /// Ledger category
    pub category: ItemCategory,
    /// Sum of line totals
    pub total_amount: Decimal,
    /// Number of lines
    pub items_count: u64,
    /// Mean line total, zero when there are none
    pub average_item_cost: Decimal,
}

/// Budget ledger broken down by category.
#[derive(Debug, Clone, Serialize)]
pub struct BudgetCategorySummary {
    /// Project summarized
    pub project_id: i64,
    /// One entry per category that has lines
    pub by_category: Vec<BudgetCategoryTotals>,
    /// Sum over all categories
    pub total_budget: Decimal,
    /// Number of lines over all categories
    pub total_items: u64,
}

/// Groups a project's budget by category, listing every category even when empty.
pub async fn summary_by_category(
    db: &DatabaseConnection,
    project_id: i64,
) -> Result<BudgetCategorySummary> {
    lookup::require::<Project, _>(db, "Project", project_id).await?;

    let items = BudgetItem::find()
        .filter(budget_item::Column::ProjectId.eq(project_id))
        .all(db)
        .await?;

    let by_category: Vec<BudgetCategoryTotals> = ItemCategory::ALL
        .into_iter()
        .map(|category| {
            let (total_amount, items_count) = items
                .iter()
                .filter(|i| i.category == category)
                .fold((Decimal::ZERO, 0u64), |(total, count), i| {
                    (total + i.total_price, count + 1)
                });
            BudgetCategoryTotals {
                category,
                total_amount,
                items_count,
                average_item_cost: if items_count > 0 {
                    money::round_money(total_amount / Decimal::from(items_count))
                } else {
                    Decimal::ZERO
                },
            }
        })
        .collect();

    Ok(BudgetCategorySummary {
        project_id,
        total_budget: by_category.iter().map(|c| c.total_amount).sum(),
        total_items: by_category.iter().map(|c| c.items_count).sum(),
        by_category,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use rust_decimal_macros::dec;

    fn purchase_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()
    }

    #[tokio::test]
    async fn test_create_budget_item_rounds_and_totals() -> Result<()> {
        let (db, project) = setup_with_project().await?;

        let mut input = budget_input(project.id, ItemCategory::Construction);
        input.quantity = dec!(2.5005);
        input.unit_price = dec!(3.335);
        let item = create_budget_item(&db, input).await?;

        assert_eq!(item.quantity, dec!(2.500));
        assert_eq!(item.unit_price, dec!(3.34));
        assert_eq!(item.total_price, dec!(8.35));
        assert!(!item.created_from_calculation);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_budget_item_rejects_zero_quantity() -> Result<()> {
        let (db, project) = setup_with_project().await?;
        let mut input = budget_input(project.id, ItemCategory::Construction);
        input.quantity = dec!(0.0004);

        let result = create_budget_item(&db, input).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert!(BudgetItem::find().all(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_budget_item_rejects_oversized_values() -> Result<()> {
        let (db, project) = setup_with_project().await?;
        let mut input = budget_input(project.id, ItemCategory::Construction);
        input.quantity = dec!(100000000000000000000);
        input.unit_price = dec!(100000000000000000000);

        let result = create_budget_item(&db, input).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let mut input = budget_input(project.id, ItemCategory::Construction);
        input.unit_price = dec!(100000000);
        let result = create_budget_item(&db, input).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        assert!(BudgetItem::find().all(&db).await?.is_empty());
        let summary = summary::get_or_create_summary(&db, project.id).await?;
        assert_eq!(summary.total_budget, dec!(0));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_budget_item_unknown_project() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_budget_item(&db, budget_input(77, ItemCategory::Labor)).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_summary_tracks_every_mutation() -> Result<()> {
        let (db, project) = setup_with_project().await?;

        let item = create_budget_item_with_total(&db, project.id, ItemCategory::Lighting, dec!(60))
            .await?;
        let summary = summary::get_or_create_summary(&db, project.id).await?;
        assert_eq!(summary.budget_lighting, dec!(60));

        let mut input = budget_input(project.id, ItemCategory::Electrical);
        input.quantity = dec!(3);
        input.unit_price = dec!(10);
        update_budget_item(&db, item.id, input).await?;
        let summary = summary::get_or_create_summary(&db, project.id).await?;
        assert_eq!(summary.budget_lighting, dec!(0));
        assert_eq!(summary.budget_others, dec!(30));
        assert_eq!(summary.total_budget, dec!(30));

        delete_budget_item(&db, item.id).await?;
        let summary = summary::get_or_create_summary(&db, project.id).await?;
        assert_eq!(summary.total_budget, dec!(0));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_budget_item_keeps_linked_expense() -> Result<()> {
        let (db, project) = setup_with_project().await?;
        let item =
            create_budget_item_with_total(&db, project.id, ItemCategory::Construction, dec!(50))
                .await?;
        let expense = copy_item_to_expense(&db, item.id, CopyOptions::on(purchase_day())).await?;

        delete_budget_item(&db, item.id).await?;

        let expense = expense::get_expense(&db, expense.id).await?;
        assert_eq!(expense.budget_item_id, None);
        let summary = summary::get_or_create_summary(&db, project.id).await?;
        assert_eq!(summary.total_budget, dec!(0));
        assert_eq!(summary.total_expenses, dec!(50));
        Ok(())
    }

    #[tokio::test]
    async fn test_copy_to_expense_preserves_line() -> Result<()> {
        let (db, project) = setup_with_project().await?;
        let mut input = budget_input(project.id, ItemCategory::Lighting);
        input.quantity = dec!(12.5);
        input.unit_price = dec!(8.4);
        input.spaces = "Lobby".to_string();
        let item = create_budget_item(&db, input).await?;

        let draft = copy_to_expense(&item);
        assert_eq!(draft.budget_item_id, item.id);
        assert_eq!(draft.notes, format!("Copied from budget: {}", item.description));

        let options = CopyOptions {
            discount_percentage: dec!(10),
            ..CopyOptions::on(purchase_day())
        };
        let expense = copy_item_to_expense(&db, item.id, options).await?;

        assert_eq!(expense.quantity, item.quantity);
        assert_eq!(expense.unit, item.unit);
        assert_eq!(expense.unit_price, item.unit_price);
        assert_eq!(expense.category, item.category);
        assert_eq!(expense.spaces, "Lobby");
        assert_eq!(expense.budget_item_id, Some(item.id));
        assert_eq!(expense.purchase_date, purchase_day());
        // 12.5 × 8.4 = 105, minus 10%
        assert_eq!(expense.total_price, dec!(94.5));

        let source = get_budget_item(&db, item.id).await?;
        assert_eq!(source, item);
        Ok(())
    }

    #[tokio::test]
    async fn test_copy_overrides_supplier_and_notes() -> Result<()> {
        let (db, project) = setup_with_project().await?;
        let supplier = create_test_supplier(&db, "Lumen Supply").await?;
        let item =
            create_budget_item_with_total(&db, project.id, ItemCategory::Lighting, dec!(20))
                .await?;

        let options = CopyOptions {
            supplier_id: Some(supplier.id),
            notes: Some("Paid in cash".to_string()),
            ..CopyOptions::on(purchase_day())
        };
        let expense = copy_item_to_expense(&db, item.id, options).await?;
        assert_eq!(expense.supplier_id, Some(supplier.id));
        assert_eq!(expense.notes, "Paid in cash");
        Ok(())
    }

    #[tokio::test]
    async fn test_copy_multiple_collects_failures() -> Result<()> {
        let (db, project) = setup_with_project().await?;
        let first =
            create_budget_item_with_total(&db, project.id, ItemCategory::Construction, dec!(10))
                .await?;
        let second =
            create_budget_item_with_total(&db, project.id, ItemCategory::Labor, dec!(25)).await?;

        let outcome = copy_multiple_to_expenses(
            &db,
            BatchCopyRequest {
                budget_item_ids: vec![first.id, 9999, second.id],
                purchase_date: purchase_day(),
                default_supplier_id: None,
            },
        )
        .await?;

        assert_eq!(outcome.created.len(), 2);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].0, 9999);
        assert!(matches!(outcome.failures[0].1, Error::NotFound { .. }));

        let summary = summary::get_or_create_summary(&db, project.id).await?;
        assert_eq!(summary.total_expenses, dec!(35));
        Ok(())
    }

    #[tokio::test]
    async fn test_copy_multiple_requires_ids() -> Result<()> {
        let db = setup_test_db().await?;
        let result = copy_multiple_to_expenses(
            &db,
            BatchCopyRequest {
                budget_item_ids: vec![],
                purchase_date: purchase_day(),
                default_supplier_id: None,
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_budget_items_price_range() -> Result<()> {
        let (db, project) = setup_with_project().await?;
        for total in [dec!(5), dec!(50), dec!(500)] {
            create_budget_item_with_total(&db, project.id, ItemCategory::Others, total).await?;
        }

        let filter = BudgetItemFilter {
            project_id: Some(project.id),
            min_price: Some(dec!(10)),
            max_price: Some(dec!(500)),
            ..Default::default()
        };
        let items = list_budget_items(&db, &filter).await?;
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.total_price >= dec!(10)));
        Ok(())
    }

    #[tokio::test]
    async fn test_budget_summary_by_category() -> Result<()> {
        let (db, project) = setup_with_project().await?;
        create_budget_item_with_total(&db, project.id, ItemCategory::Construction, dec!(100))
            .await?;
        create_budget_item_with_total(&db, project.id, ItemCategory::Construction, dec!(50))
            .await?;
        create_budget_item_with_total(&db, project.id, ItemCategory::Lighting, dec!(25)).await?;

        let report = summary_by_category(&db, project.id).await?;
        let construction = &report.by_category[0];
        assert_eq!(construction.items_count, 2);
        assert_eq!(construction.total_amount, dec!(150));
        assert_eq!(construction.average_item_cost, dec!(75));
        assert_eq!(report.total_budget, dec!(175));
        assert_eq!(report.total_items, 3);
        Ok(())
    }
}
