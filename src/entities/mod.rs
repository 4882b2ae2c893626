//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod budget_item;
pub mod calculation;
pub mod calculation_details;
pub mod enums;
pub mod financial_summary;
pub mod material;
pub mod project;
pub mod real_expense;
pub mod session;
pub mod supplier;
pub mod supplier_price;

// Re-export specific types to avoid conflicts
pub use budget_item::{Column as BudgetItemColumn, Entity as BudgetItem, Model as BudgetItemModel};
pub use calculation::{
    Column as CalculationColumn, Entity as Calculation, Model as CalculationModel,
};
pub use calculation_details::{
    cable::Entity as CableCalculation, gypsum::Entity as GypsumCalculation,
    led_strip::Entity as LedStripCalculation, paint::Entity as PaintCalculation,
};
pub use enums::{
    CalculatorKind, ItemCategory, MaterialCategory, ProjectPhase, ProjectStatus, ProjectType,
    SupplierType,
};
pub use financial_summary::{
    Column as FinancialSummaryColumn, Entity as FinancialSummary, Model as FinancialSummaryModel,
};
pub use material::{Column as MaterialColumn, Entity as Material, Model as MaterialModel};
pub use project::{Column as ProjectColumn, Entity as Project, Model as ProjectModel};
pub use real_expense::{
    Column as RealExpenseColumn, Entity as RealExpense, Model as RealExpenseModel,
};
pub use session::{Column as SessionColumn, Entity as Session, Model as SessionModel};
pub use supplier::{Column as SupplierColumn, Entity as Supplier, Model as SupplierModel};
pub use supplier_price::{
    Column as SupplierPriceColumn, Entity as SupplierPrice, Model as SupplierPriceModel,
};
