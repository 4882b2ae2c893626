/// Budget ledger: planned line items and copy-to-expense
pub mod budget;

/// Persisted calculator runs and turning them into budget lines
pub mod calculation;

/// Pure quantity calculators
pub mod calculator;

/// Catalog seeding from configuration
pub mod catalog;

/// Expense ledger: actual purchases with discounts
pub mod expense;

/// Primary-key lookups with not-found errors
mod lookup;

/// Material catalog operations
pub mod material;

/// Decimal rounding and validation helpers
pub mod money;

/// Project lifecycle, dashboard and statistics
pub mod project;

/// Per-session project selection
pub mod session;

/// Financial summary aggregation
pub mod summary;

/// Suppliers, price book and price comparison
pub mod supplier;
