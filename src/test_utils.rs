//! Shared test utilities for the ledger service.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        budget::{self, BudgetItemInput},
        expense::{self, ExpenseInput},
        material::{self, MaterialInput},
        project::{self, ProjectInput},
        supplier::{self, PriceInput, SupplierInput},
    },
    entities::{self, ItemCategory, MaterialCategory, SupplierType},
    errors::Result,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test database holding a single project named "Test project".
pub async fn setup_with_project() -> Result<(DatabaseConnection, entities::project::Model)> {
    let db = setup_test_db().await?;
    let project = create_test_project(&db, "Test project").await?;
    Ok((db, project))
}

fn test_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default()
}

/// Creates a test project with sensible defaults.
///
/// # Defaults
/// * client: "Test client"
/// * type: residential, status planning, phase design
/// * start date: 2024-01-01, no end date
pub async fn create_test_project(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::project::Model> {
    project::create_project(db, ProjectInput::new(name, "Test client", test_start_date())).await
}

/// Creates an active construction material priced at 10 per unit.
pub async fn create_test_material(
    db: &DatabaseConnection,
    code: &str,
) -> Result<entities::material::Model> {
    let input = MaterialInput {
        reference_price: Some(dec!(10)),
        ..MaterialInput::new(
            code,
            &format!("Test material {code}"),
            MaterialCategory::Construction,
            "unit",
        )
    };
    material::create_material(db, input).await
}

/// Creates an active materials supplier without delivery, rated 3.
pub async fn create_test_supplier(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::supplier::Model> {
    supplier::create_supplier(db, SupplierInput::new(name, SupplierType::Materials)).await
}

/// Plain price entry with no discounts, valid from today.
#[must_use]
pub fn price_input(material_id: i64, price: Decimal) -> PriceInput {
    PriceInput::new(material_id, price)
}

/// Budget line of one unit at 10.
#[must_use]
pub fn budget_input(project_id: i64, category: ItemCategory) -> BudgetItemInput {
    BudgetItemInput {
        project_id,
        material_id: None,
        supplier_id: None,
        description: format!("Test {category} item"),
        category,
        spaces: String::new(),
        quantity: dec!(1),
        unit: "unit".to_string(),
        unit_price: dec!(10),
        notes: String::new(),
    }
}

/// Undiscounted expense bought on 2024-03-01.
#[must_use]
pub fn expense_input(
    project_id: i64,
    category: ItemCategory,
    quantity: Decimal,
    unit_price: Decimal,
) -> ExpenseInput {
    ExpenseInput {
        project_id,
        budget_item_id: None,
        material_id: None,
        supplier_id: None,
        description: format!("Test {category} purchase"),
        category,
        spaces: String::new(),
        quantity,
        unit: "unit".to_string(),
        unit_price,
        discount_percentage: Decimal::ZERO,
        discount_amount: Decimal::ZERO,
        purchase_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap_or_default(),
        invoice_number: String::new(),
        payment_method: String::new(),
        notes: String::new(),
    }
}

/// Creates a single-unit budget line whose total is `total`.
pub async fn create_budget_item_with_total(
    db: &DatabaseConnection,
    project_id: i64,
    category: ItemCategory,
    total: Decimal,
) -> Result<entities::budget_item::Model> {
    let input = BudgetItemInput {
        unit_price: total,
        ..budget_input(project_id, category)
    };
    budget::create_budget_item(db, input).await
}

/// Creates a single-unit undiscounted expense whose total is `total`.
pub async fn create_expense_with_total(
    db: &DatabaseConnection,
    project_id: i64,
    category: ItemCategory,
    total: Decimal,
) -> Result<entities::real_expense::Model> {
    expense::create_expense(db, expense_input(project_id, category, dec!(1), total)).await
}
