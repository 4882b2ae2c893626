//! Catalog seeding from `catalog.toml`.
//!
//! Seeding only inserts what is missing: materials are matched by code,
//! suppliers by name, and a price entry is added only when the supplier has no
//! current price for that material. Running it twice changes nothing.

use crate::{
    config::catalog::{CatalogConfig, MaterialConfig, SupplierConfig},
    core::{
        material::{self as materials, MaterialInput},
        supplier::{self as suppliers, PriceInput, SupplierInput},
    },
    entities::{Material, Supplier, SupplierPrice, material, supplier, supplier_price},
    errors::Result,
};
use sea_orm::{PaginatorTrait, prelude::*};
use tracing::{info, warn};

/// What a seeding pass inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// New materials inserted
    pub materials_created: usize,
    /// New suppliers inserted
    pub suppliers_created: usize,
    /// New price entries inserted
    pub prices_created: usize,
    /// Price entries naming a material code that does not exist
    pub prices_skipped: usize,
}

impl From<&MaterialConfig> for MaterialInput {
    fn from(config: &MaterialConfig) -> Self {
        let mut input = Self::new(&config.code, &config.name, config.category, &config.unit);
        input.description.clone_from(&config.description);
        input.reference_price = config.reference_price;
        input.yield_per_unit = config.yield_per_unit;
        if let Some(waste) = config.waste_factor {
            input.waste_factor = waste;
        }
        input.coverage_per_liter = config.coverage_per_liter;
        input.power_per_meter = config.power_per_meter;
        input.wire_gauge.clone_from(&config.wire_gauge);
        input
    }
}

impl From<&SupplierConfig> for SupplierInput {
    fn from(config: &SupplierConfig) -> Self {
        let mut input = Self::new(&config.name, config.supplier_type);
        input.phone.clone_from(&config.phone);
        input.city.clone_from(&config.city);
        input.offers_delivery = config.offers_delivery;
        input.delivery_cost = config.delivery_cost;
        if let Some(rating) = config.rating {
            input.rating = rating;
        }
        input.is_preferred = config.is_preferred;
        input
    }
}

/// Inserts the catalog's missing materials, suppliers and prices.
pub async fn seed_catalog(db: &DatabaseConnection, config: &CatalogConfig) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    for entry in &config.materials {
        let exists = Material::find()
            .filter(material::Column::Code.eq(entry.code.trim()))
            .one(db)
            .await?
            .is_some();
        if !exists {
            materials::create_material(db, MaterialInput::from(entry)).await?;
            report.materials_created += 1;
        }
    }

    for entry in &config.suppliers {
        let existing = Supplier::find()
            .filter(supplier::Column::Name.eq(entry.name.trim()))
            .one(db)
            .await?;
        let supplier = match existing {
            Some(s) => s,
            None => {
                report.suppliers_created += 1;
                suppliers::create_supplier(db, SupplierInput::from(entry)).await?
            }
        };

        for price in &entry.prices {
            let Some(priced) = Material::find()
                .filter(material::Column::Code.eq(price.material_code.trim()))
                .one(db)
                .await?
            else {
                warn!(
                    supplier = %supplier.name,
                    material_code = %price.material_code,
                    "Catalog price refers to an unknown material, skipping"
                );
                report.prices_skipped += 1;
                continue;
            };

            let has_current = SupplierPrice::find()
                .filter(supplier_price::Column::SupplierId.eq(supplier.id))
                .filter(supplier_price::Column::MaterialId.eq(priced.id))
                .filter(supplier_price::Column::IsCurrent.eq(true))
                .count(db)
                .await?
                > 0;
            if has_current {
                continue;
            }

            let input = PriceInput {
                discount_percentage: price.discount_percentage,
                bulk_discount_threshold: price.bulk_discount_threshold,
                bulk_discount_percentage: price.bulk_discount_percentage,
                ..PriceInput::new(priced.id, price.price)
            };
            suppliers::add_price(db, supplier.id, input).await?;
            report.prices_created += 1;
        }
    }

    info!(
        materials = report.materials_created,
        suppliers = report.suppliers_created,
        prices = report.prices_created,
        skipped = report.prices_skipped,
        "Catalog seeded"
    );
    Ok(report)
}
