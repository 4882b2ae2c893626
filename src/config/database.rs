//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust structs
//! without hand-written SQL.

use crate::entities::{
    BudgetItem, CableCalculation, Calculation, FinancialSummary, GypsumCalculation,
    LedStripCalculation, Material, PaintCalculation, Project, RealExpense, Session, Supplier,
    SupplierPrice,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::debug;

const DEFAULT_DATABASE_URL: &str = "sqlite://site_budget.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable or returns
/// the default local `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the configured database.
///
/// Falls back to a local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {database_url}");
    Database::connect(&database_url).await.map_err(Into::into)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all tables that do not exist yet.
///
/// Parents are created before the tables that reference them.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, Project).await?;
    create_table(db, &schema, Material).await?;
    create_table(db, &schema, Supplier).await?;
    create_table(db, &schema, SupplierPrice).await?;
    create_table(db, &schema, BudgetItem).await?;
    create_table(db, &schema, RealExpense).await?;
    create_table(db, &schema, Calculation).await?;
    create_table(db, &schema, PaintCalculation).await?;
    create_table(db, &schema, GypsumCalculation).await?;
    create_table(db, &schema, LedStripCalculation).await?;
    create_table(db, &schema, CableCalculation).await?;
    create_table(db, &schema, FinancialSummary).await?;
    create_table(db, &schema, Session).await?;

    Ok(())
}
