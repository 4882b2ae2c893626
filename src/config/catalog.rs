//! Catalog seed configuration loaded from a TOML file.
//!
//! Materials, suppliers and price-book entries defined in `catalog.toml` are
//! inserted on start-up when they are missing (see
//! [`crate::core::catalog::seed_catalog`]).

use crate::entities::{MaterialCategory, SupplierType};
use crate::errors::{Error, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire catalog file
#[derive(Debug, Deserialize, Default)]
pub struct CatalogConfig {
    /// Materials to seed, keyed by `code`
    #[serde(default)]
    pub materials: Vec<MaterialConfig>,
    /// Suppliers to seed, keyed by `name`
    #[serde(default)]
    pub suppliers: Vec<SupplierConfig>,
}

/// Configuration for a single catalog material
#[derive(Debug, Deserialize, Clone)]
pub struct MaterialConfig {
    /// Unique catalog code, the seeding key
    pub code: String,
    /// Display name
    pub name: String,
    /// Catalog grouping
    pub category: MaterialCategory,
    /// Unit of sale, e.g. "liter" or "sheet"
    pub unit: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Typical price per unit
    pub reference_price: Option<Decimal>,
    /// Area or length one unit covers
    pub yield_per_unit: Option<Decimal>,
    /// Fraction lost to waste, defaults to 0.05
    pub waste_factor: Option<Decimal>,
    /// Paint coverage in m² per liter
    pub coverage_per_liter: Option<Decimal>,
    /// LED strip consumption in W/m
    pub power_per_meter: Option<Decimal>,
    /// Cable gauge, e.g. "12 AWG"
    pub wire_gauge: Option<String>,
}

/// Configuration for a supplier and its price list
#[derive(Debug, Deserialize, Clone)]
pub struct SupplierConfig {
    /// Supplier name, the seeding key
    pub name: String,
    /// What the supplier sells
    pub supplier_type: SupplierType,
    /// Contact phone
    #[serde(default)]
    pub phone: String,
    /// City the supplier delivers from
    #[serde(default)]
    pub city: String,
    /// Whether the supplier delivers
    #[serde(default)]
    pub offers_delivery: bool,
    /// Flat delivery charge per order
    pub delivery_cost: Option<Decimal>,
    /// Rating from 1 to 5, defaults to 3
    pub rating: Option<i32>,
    /// Listed first when quotes tie
    #[serde(default)]
    pub is_preferred: bool,
    /// Current prices offered by this supplier
    #[serde(default)]
    pub prices: Vec<PriceConfig>,
}

/// One price-book entry, referring to a material by code
#[derive(Debug, Deserialize, Clone)]
pub struct PriceConfig {
    /// Code of the priced material
    pub material_code: String,
    /// Price per unit
    pub price: Decimal,
    /// Flat discount in percent
    #[serde(default)]
    pub discount_percentage: Decimal,
    /// Quantity from which the bulk discount applies
    pub bulk_discount_threshold: Option<Decimal>,
    /// Bulk discount in percent, replaces the flat one
    pub bulk_discount_percentage: Option<Decimal>,
}

/// Loads the catalog configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CatalogConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read catalog file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse catalog file: {e}"),
    })
}

/// Loads the catalog from `CATALOG_PATH`, or `./catalog.toml` when unset
pub fn load_default_config() -> Result<CatalogConfig> {
    let path = std::env::var("CATALOG_PATH").unwrap_or_else(|_| "catalog.toml".to_string());
    load_config(path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_catalog_config() {
        let toml_str = r#"
            [[materials]]
            code = "PAINT-LATEX-001"
            name = "Latex paint"
            category = "construction"
            unit = "liter"
            reference_price = 4.50
            coverage_per_liter = 10

            [[suppliers]]
            name = "Hardware Depot"
            supplier_type = "materials"
            offers_delivery = true
            delivery_cost = 15

            [[suppliers.prices]]
            material_code = "PAINT-LATEX-001"
            price = 4.25
            discount_percentage = 5
            bulk_discount_threshold = 100
            bulk_discount_percentage = 12
        "#;

        let config: CatalogConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.materials.len(), 1);
        assert_eq!(config.materials[0].category, MaterialCategory::Construction);
        assert_eq!(config.materials[0].reference_price, Some(dec!(4.50)));
        assert_eq!(config.materials[0].waste_factor, None);

        assert_eq!(config.suppliers.len(), 1);
        let supplier = &config.suppliers[0];
        assert!(supplier.offers_delivery);
        assert_eq!(supplier.prices.len(), 1);
        assert_eq!(supplier.prices[0].bulk_discount_percentage, Some(dec!(12)));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = load_config("does/not/exist.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
