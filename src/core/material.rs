//! Material catalog operations.
//!
//! Materials are shared reference data. Ledger rows and calculations only point
//! at them optionally, so deleting a material clears those pointers and drops
//! its price-book entries instead of touching the ledgers.

use crate::{
    core::{lookup, money},
    entities::{
        BudgetItem, Calculation, CalculatorKind, Material, MaterialCategory, RealExpense,
        Supplier, SupplierPrice, budget_item, calculation, material, real_expense, supplier,
        supplier_price,
    },
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Most suggestions returned with a calculator result
const MAX_SUGGESTIONS: usize = 5;

fn default_waste_factor() -> Decimal {
    dec!(0.05)
}

const fn default_true() -> bool {
    true
}

/// Fields a client supplies for a material.
#[derive(Debug, Clone, Deserialize)]
pub struct MaterialInput {
    /// Display name
    pub name: String,
    /// Unique catalog code
    pub code: String,
    /// Catalog grouping
    pub category: MaterialCategory,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Unit of sale
    pub unit: String,
    /// Area or length one unit covers
    pub yield_per_unit: Option<Decimal>,
    /// Fraction lost to waste, in [0, 1)
    #[serde(default = "default_waste_factor")]
    pub waste_factor: Decimal,
    /// Typical price per unit
    pub reference_price: Option<Decimal>,
    /// Inactive materials are hidden from calculators
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Paint coverage in m² per liter
    pub coverage_per_liter: Option<Decimal>,
    /// LED strip consumption in W/m
    pub power_per_meter: Option<Decimal>,
    /// Cable gauge
    pub wire_gauge: Option<String>,
}

impl MaterialInput {
    /// Minimal input with the default waste factor, active, no technical fields.
    #[must_use]
    pub fn new(code: &str, name: &str, category: MaterialCategory, unit: &str) -> Self {
        Self {
            name: name.to_string(),
            code: code.to_string(),
            category,
            description: String::new(),
            unit: unit.to_string(),
            yield_per_unit: None,
            waste_factor: default_waste_factor(),
            reference_price: None,
            is_active: true,
            coverage_per_liter: None,
            power_per_meter: None,
            wire_gauge: None,
        }
    }
}

/// Material list filters; they combine with AND.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MaterialFilter {
    /// Only this category
    pub category: Option<MaterialCategory>,
    /// Include inactive materials
    #[serde(default)]
    pub include_inactive: bool,
    /// Only materials with a reference price
    #[serde(default)]
    pub has_price: bool,
    /// Substring match on name or code
    pub search: Option<String>,
}

fn validate(input: &MaterialInput) -> Result<()> {
    if input.code.trim().is_empty() {
        return Err(Error::validation("code cannot be empty"));
    }
    if input.name.trim().is_empty() {
        return Err(Error::validation("name cannot be empty"));
    }
    if input.unit.trim().is_empty() {
        return Err(Error::validation("unit cannot be empty"));
    }
    if input.waste_factor < Decimal::ZERO || input.waste_factor >= Decimal::ONE {
        return Err(Error::validation(format!(
            "waste_factor must be a fraction in [0, 1) (got {})",
            input.waste_factor
        )));
    }
    if let Some(price) = input.reference_price {
        money::positive_money("reference_price", price)?;
    }
    if let Some(yield_per_unit) = input.yield_per_unit {
        money::positive_quantity("yield_per_unit", yield_per_unit)?;
    }
    Ok(())
}

async fn ensure_code_free<C>(db: &C, code: &str, except_id: Option<i64>) -> Result<()>
where
    C: ConnectionTrait,
{
    let existing = Material::find()
        .filter(material::Column::Code.eq(code))
        .one(db)
        .await?;
    match existing {
        Some(m) if Some(m.id) != except_id => Err(Error::conflict(format!(
            "Material code '{code}' is already used by material {}",
            m.id
        ))),
        _ => Ok(()),
    }
}

/// Creates a catalog material. Codes are unique.
pub async fn create_material<C>(db: &C, input: MaterialInput) -> Result<material::Model>
where
    C: ConnectionTrait,
{
    validate(&input)?;
    let code = input.code.trim().to_string();
    ensure_code_free(db, &code, None).await?;

    let now = chrono::Utc::now();
    let model = material::ActiveModel {
        name: Set(input.name.trim().to_string()),
        code: Set(code),
        category: Set(input.category),
        description: Set(input.description),
        unit: Set(input.unit),
        yield_per_unit: Set(input.yield_per_unit),
        waste_factor: Set(input.waste_factor),
        reference_price: Set(input.reference_price.map(money::round_money)),
        last_price_update: Set(input.reference_price.map(|_| now)),
        is_active: Set(input.is_active),
        coverage_per_liter: Set(input.coverage_per_liter),
        power_per_meter: Set(input.power_per_meter),
        wire_gauge: Set(input.wire_gauge),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    debug!(material_id = created.id, code = %created.code, "Material created");
    Ok(created)
}

/// Retrieves a material by id.
pub async fn get_material(db: &DatabaseConnection, material_id: i64) -> Result<material::Model> {
    lookup::require::<Material, _>(db, "Material", material_id).await
}

/// Replaces a material's fields. A changed reference price stamps `last_price_update`.
pub async fn update_material(
    db: &DatabaseConnection,
    material_id: i64,
    input: MaterialInput,
) -> Result<material::Model> {
    validate(&input)?;
    let existing = get_material(db, material_id).await?;
    let code = input.code.trim().to_string();
    ensure_code_free(db, &code, Some(material_id)).await?;

    let now = chrono::Utc::now();
    let reference_price = input.reference_price.map(money::round_money);
    let price_changed = reference_price != existing.reference_price;

    let mut model: material::ActiveModel = existing.into();
    model.name = Set(input.name.trim().to_string());
    model.code = Set(code);
    model.category = Set(input.category);
    model.description = Set(input.description);
    model.unit = Set(input.unit);
    model.yield_per_unit = Set(input.yield_per_unit);
    model.waste_factor = Set(input.waste_factor);
    model.reference_price = Set(reference_price);
    if price_changed {
        model.last_price_update = Set(Some(now));
    }
    model.is_active = Set(input.is_active);
    model.coverage_per_liter = Set(input.coverage_per_liter);
    model.power_per_meter = Set(input.power_per_meter);
    model.wire_gauge = Set(input.wire_gauge);
    model.updated_at = Set(now);

    model.update(db).await.map_err(Into::into)
}

/// Deletes a material, clearing references to it and removing its prices.
pub async fn delete_material(db: &DatabaseConnection, material_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let material = lookup::require::<Material, _>(&txn, "Material", material_id).await?;

    BudgetItem::update_many()
        .col_expr(budget_item::Column::MaterialId, Expr::value(Option::<i64>::None))
        .filter(budget_item::Column::MaterialId.eq(material_id))
        .exec(&txn)
        .await?;
    RealExpense::update_many()
        .col_expr(real_expense::Column::MaterialId, Expr::value(Option::<i64>::None))
        .filter(real_expense::Column::MaterialId.eq(material_id))
        .exec(&txn)
        .await?;
    Calculation::update_many()
        .col_expr(calculation::Column::MaterialId, Expr::value(Option::<i64>::None))
        .filter(calculation::Column::MaterialId.eq(material_id))
        .exec(&txn)
        .await?;
    SupplierPrice::delete_many()
        .filter(supplier_price::Column::MaterialId.eq(material_id))
        .exec(&txn)
        .await?;

    material.delete(&txn).await?;
    txn.commit().await?;

    info!(material_id, "Material deleted");
    Ok(())
}

/// Lists materials ordered by category and name. Inactive ones are hidden by default.
pub async fn list_materials(
    db: &DatabaseConnection,
    filter: &MaterialFilter,
) -> Result<Vec<material::Model>> {
    let mut query = Material::find();

    if !filter.include_inactive {
        query = query.filter(material::Column::IsActive.eq(true));
    }
    if let Some(category) = filter.category {
        query = query.filter(material::Column::Category.eq(category));
    }
    if filter.has_price {
        query = query.filter(material::Column::ReferencePrice.is_not_null());
    }
    if let Some(search) = &filter.search {
        query = query.filter(
            material::Column::Name
                .contains(search.as_str())
                .or(material::Column::Code.contains(search.as_str())),
        );
    }

    query
        .order_by_asc(material::Column::Category)
        .order_by_asc(material::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Active materials of one category, as offered in calculator pickers.
pub async fn materials_for_calculator(
    db: &DatabaseConnection,
    category: MaterialCategory,
) -> Result<Vec<material::Model>> {
    list_materials(
        db,
        &MaterialFilter {
            category: Some(category),
            ..Default::default()
        },
    )
    .await
}

/// Active materials grouped by category, in category declaration order.
#[derive(Debug, Clone, Serialize)]
pub struct MaterialGroup {
    /// Catalog grouping
    pub category: MaterialCategory,
    /// Active materials in it, by name
    pub materials: Vec<material::Model>,
}

/// Lists active materials grouped by category; empty categories are left out.
pub async fn materials_by_category(db: &DatabaseConnection) -> Result<Vec<MaterialGroup>> {
    let materials = list_materials(db, &MaterialFilter::default()).await?;

    let mut groups: Vec<MaterialGroup> = Vec::new();
    for m in materials {
        match groups.iter_mut().find(|g| g.category == m.category) {
            Some(group) => group.materials.push(m),
            None => groups.push(MaterialGroup {
                category: m.category,
                materials: vec![m],
            }),
        }
    }
    Ok(groups)
}

/// Cheapest active materials matching a calculator's category and keyword.
///
/// With a `size_hint`, materials whose name also contains the hint are
/// preferred; when none match the hint the keyword matches are used.
/// Materials without a reference price sort last.
pub async fn suggestions_for<C>(
    db: &C,
    kind: CalculatorKind,
    size_hint: Option<&str>,
) -> Result<Vec<material::Model>>
where
    C: ConnectionTrait,
{
    let (category, keyword) = kind.suggestion_filter();
    let mut candidates = Material::find()
        .filter(material::Column::IsActive.eq(true))
        .filter(material::Column::Category.eq(category))
        .filter(material::Column::Name.contains(keyword))
        .all(db)
        .await?;

    if let Some(size) = size_hint.map(str::to_lowercase).filter(|s| !s.is_empty()) {
        let sized: Vec<material::Model> = candidates
            .iter()
            .filter(|m| m.name.to_lowercase().contains(&size))
            .cloned()
            .collect();
        if sized.is_empty() {
            debug!(%kind, %size, "No sized material suggestions, using general matches");
        } else {
            candidates = sized;
        }
    }

    candidates.sort_by(|a, b| match (a.reference_price, b.reference_price) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.name.cmp(&b.name),
    });
    candidates.truncate(MAX_SUGGESTIONS);
    Ok(candidates)
}

/// Result of a yield-based quantity estimate.
#[derive(Debug, Clone, Serialize)]
pub struct QuantityEstimate {
    /// Material estimated
    pub material_id: i64,
    /// Area or length to cover
    pub area_or_length: Decimal,
    /// Layers applied
    pub layers: u32,
    /// Units to buy, waste included
    pub quantity_needed: Decimal,
    /// Unit of sale
    pub unit: String,
    /// Cost at the reference price, if priced
    pub estimated_cost: Option<Decimal>,
    /// Waste fraction used
    pub waste_factor_applied: Decimal,
}

/// `round((area_or_length × layers / yield) × (1 + waste), 2)` for one material.
///
/// # Errors
/// `Error::Validation` when the material has no yield, or the inputs are not positive.
pub async fn calculate_quantity(
    db: &DatabaseConnection,
    material_id: i64,
    area_or_length: Decimal,
    layers: u32,
) -> Result<QuantityEstimate> {
    let material = get_material(db, material_id).await?;
    let area_or_length = money::positive_quantity("area_or_length", area_or_length)?;
    if layers == 0 {
        return Err(Error::validation("layers must be at least 1"));
    }
    let yield_per_unit = material
        .yield_per_unit
        .filter(|y| *y > Decimal::ZERO)
        .ok_or_else(|| {
            Error::validation(format!(
                "Material {} has no yield per unit configured",
                material.code
            ))
        })?;

    let base = area_or_length * Decimal::from(layers) / yield_per_unit;
    let quantity_needed = money::round_money(base * (Decimal::ONE + material.waste_factor));

    Ok(QuantityEstimate {
        material_id,
        area_or_length,
        layers,
        estimated_cost: material
            .reference_price
            .map(|price| money::round_money(quantity_needed * price)),
        quantity_needed,
        unit: material.unit,
        waste_factor_applied: material.waste_factor,
    })
}

/// A current price entry together with the supplier offering it.
#[derive(Debug, Clone, Serialize)]
pub struct SupplierOffer {
    /// Price entry
    #[serde(flatten)]
    pub price: supplier_price::Model,
    /// Supplier display name
    pub supplier_name: String,
    /// Whether the supplier delivers
    pub offers_delivery: bool,
    /// Delivery charge, if any
    pub delivery_cost: Option<Decimal>,
}

/// Current prices for a material from active suppliers, cheapest first.
pub async fn suppliers_for(db: &DatabaseConnection, material_id: i64) -> Result<Vec<SupplierOffer>> {
    get_material(db, material_id).await?;

    let rows = SupplierPrice::find()
        .find_also_related(Supplier)
        .filter(supplier_price::Column::MaterialId.eq(material_id))
        .filter(supplier_price::Column::IsCurrent.eq(true))
        .filter(supplier::Column::IsActive.eq(true))
        .order_by_asc(supplier_price::Column::Price)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(price, supplier)| {
            supplier.map(|s| SupplierOffer {
                supplier_name: s.display_name().to_string(),
                offers_delivery: s.offers_delivery,
                delivery_cost: s.delivery_cost,
                price,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::ItemCategory;
    use crate::test_utils::*;

    fn priced(code: &str, name: &str, category: MaterialCategory, price: Decimal) -> MaterialInput {
        MaterialInput {
            reference_price: Some(price),
            ..MaterialInput::new(code, name, category, "unit")
        }
    }

    #[tokio::test]
    async fn test_create_material_rejects_duplicate_code() -> Result<()> {
        let db = setup_test_db().await?;
        create_material(&db, MaterialInput::new("PT-1", "Latex paint", MaterialCategory::Construction, "liter"))
            .await?;

        let result = create_material(
            &db,
            MaterialInput::new("PT-1", "Enamel paint", MaterialCategory::Construction, "liter"),
        )
        .await;
        assert!(matches!(result, Err(Error::Conflict { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_material_defaults() -> Result<()> {
        let db = setup_test_db().await?;
        let m = create_material(&db, priced("GY-1", "Gypsum board 12.7", MaterialCategory::Construction, dec!(9.999)))
            .await?;
        assert_eq!(m.waste_factor, dec!(0.05));
        assert_eq!(m.reference_price, Some(dec!(10.00)));
        assert!(m.last_price_update.is_some());
        assert!(m.is_active);
        Ok(())
    }

    #[tokio::test]
    async fn test_calculate_quantity_with_waste() -> Result<()> {
        let db = setup_test_db().await?;
        let input = MaterialInput {
            yield_per_unit: Some(dec!(10)),
            reference_price: Some(dec!(3)),
            ..MaterialInput::new("PT-2", "Primer paint", MaterialCategory::Construction, "liter")
        };
        let m = create_material(&db, input).await?;

        let estimate = calculate_quantity(&db, m.id, dec!(100), 2).await?;
        // 100 × 2 / 10 = 20, plus 5% = 21
        assert_eq!(estimate.quantity_needed, dec!(21));
        assert_eq!(estimate.estimated_cost, Some(dec!(63)));
        assert_eq!(estimate.unit, "liter");
        Ok(())
    }

    #[tokio::test]
    async fn test_calculate_quantity_requires_yield() -> Result<()> {
        let db = setup_test_db().await?;
        let m = create_material(&db, MaterialInput::new("CB-1", "Cable 12", MaterialCategory::Electrical, "roll"))
            .await?;
        let result = calculate_quantity(&db, m.id, dec!(10), 1).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_suggestions_cheapest_first_and_capped() -> Result<()> {
        let db = setup_test_db().await?;
        for (i, price) in [dec!(9), dec!(3), dec!(7), dec!(1), dec!(5), dec!(11)].into_iter().enumerate() {
            create_material(
                &db,
                priced(&format!("PT-{i}"), &format!("Paint {i}"), MaterialCategory::Construction, price),
            )
            .await?;
        }
        create_material(&db, priced("GY-1", "Gypsum board", MaterialCategory::Construction, dec!(0.5)))
            .await?;
        let inactive = MaterialInput {
            is_active: false,
            ..priced("PT-X", "Paint discontinued", MaterialCategory::Construction, dec!(0.1))
        };
        create_material(&db, inactive).await?;

        let suggestions = suggestions_for(&db, CalculatorKind::Paint, None).await?;
        let prices: Vec<Decimal> = suggestions.iter().filter_map(|m| m.reference_price).collect();
        assert_eq!(prices, vec![dec!(1), dec!(3), dec!(5), dec!(7), dec!(9)]);
        Ok(())
    }

    #[tokio::test]
    async fn test_suggestions_prefer_size_match() -> Result<()> {
        let db = setup_test_db().await?;
        create_material(&db, priced("PR-1", "Profile 10mm", MaterialCategory::Lighting, dec!(2))).await?;
        create_material(&db, priced("PR-2", "Profile 16mm", MaterialCategory::Lighting, dec!(4))).await?;

        let sized = suggestions_for(&db, CalculatorKind::Profiles, Some("16mm")).await?;
        assert_eq!(sized.len(), 1);
        assert_eq!(sized[0].code, "PR-2");

        let fallback = suggestions_for(&db, CalculatorKind::Profiles, Some("25mm")).await?;
        assert_eq!(fallback.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_material_clears_references() -> Result<()> {
        let (db, project) = setup_with_project().await?;
        let m = create_material(&db, priced("LD-1", "LED strip", MaterialCategory::Lighting, dec!(20))).await?;
        let supplier = create_test_supplier(&db, "Bright Co").await?;
        crate::core::supplier::add_price(&db, supplier.id, price_input(m.id, dec!(18))).await?;

        let mut input = budget_input(project.id, ItemCategory::Lighting);
        input.material_id = Some(m.id);
        let item = crate::core::budget::create_budget_item(&db, input).await?;

        delete_material(&db, m.id).await?;

        let item = crate::core::budget::get_budget_item(&db, item.id).await?;
        assert_eq!(item.material_id, None);
        assert!(SupplierPrice::find().all(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_suppliers_for_lists_current_prices() -> Result<()> {
        let db = setup_test_db().await?;
        let m = create_material(&db, priced("CB-2", "Cable 14", MaterialCategory::Electrical, dec!(30))).await?;
        let cheap = create_test_supplier(&db, "Cheap Wire").await?;
        let pricey = create_test_supplier(&db, "Premium Wire").await?;
        crate::core::supplier::add_price(&db, pricey.id, price_input(m.id, dec!(35))).await?;
        crate::core::supplier::add_price(&db, cheap.id, price_input(m.id, dec!(28))).await?;

        let offers = suppliers_for(&db, m.id).await?;
        assert_eq!(offers.len(), 2);
        assert_eq!(offers[0].supplier_name, "Cheap Wire");
        Ok(())
    }
}
