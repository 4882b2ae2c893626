//! Persisted calculator runs.
//!
//! [`run_calculation`] computes a result with [`crate::core::calculator`],
//! rounds it, and stores the header row plus the kind-specific detail row in
//! one transaction. [`add_to_budget`] turns a stored run into a budget line at
//! most once.

use crate::{
    core::{
        budget::{self, BudgetItemInput},
        calculator::{CalculatorDetails, CalculatorInput, CalculatorOutput},
        lookup, material as materials, money, summary,
    },
    entities::{
        Calculation, CalculatorKind, Material, Project, budget_item, calculation,
        calculation_details, material,
    },
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// A calculator run for a project, optionally priced against a material.
#[derive(Debug, Clone)]
pub struct CalculationRequest {
    /// Project the run belongs to
    pub project_id: i64,
    /// Material the result is priced with
    pub material_id: Option<i64>,
    /// Calculator and its measurements
    pub input: CalculatorInput,
}

/// Catalog entry offered alongside a calculator result.
#[derive(Debug, Clone, Serialize)]
pub struct MaterialSuggestion {
    /// Material id
    pub id: i64,
    /// Display name
    pub name: String,
    /// Catalog code
    pub code: String,
    /// Unit of sale
    pub unit: String,
    /// Typical price per unit
    pub reference_price: Option<Decimal>,
}

impl From<material::Model> for MaterialSuggestion {
    fn from(m: material::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            code: m.code,
            unit: m.unit,
            reference_price: m.reference_price,
        }
    }
}

/// What a calculator endpoint returns.
#[derive(Debug, Clone, Serialize)]
pub struct CalculationResult {
    /// Stored calculation id
    pub calculation_id: i64,
    /// Calculator used
    pub calculation_type: CalculatorKind,
    /// Rounded quantity
    pub calculated_quantity: Decimal,
    /// Unit of the quantity
    pub unit: String,
    /// Cost at the material's reference price, if priced
    pub estimated_cost: Option<Decimal>,
    /// Intermediate figures
    pub detailed_results: serde_json::Value,
    /// Calculator-specific figures
    pub specific_details: CalculatorDetails,
    /// Cheapest matching catalog materials
    pub material_suggestions: Vec<MaterialSuggestion>,
}

fn to_i32(field: &str, value: u32) -> Result<i32> {
    i32::try_from(value).map_err(|_| Error::validation(format!("{field} is out of range")))
}

/// Writes the detail row for kinds that have one. Putty and profiles runs keep
/// their figures in `detailed_results` only.
async fn insert_details<C>(db: &C, calculation_id: i64, details: &CalculatorDetails) -> Result<()>
where
    C: ConnectionTrait,
{
    match details {
        CalculatorDetails::Paint(d) => {
            calculation_details::paint::ActiveModel {
                calculation_id: Set(calculation_id),
                area_to_paint: Set(d.area_to_paint),
                number_of_coats: Set(to_i32("number_of_coats", d.number_of_coats)?),
                paint_type: Set(d.paint_type.clone()),
                coverage_per_liter: Set(d.coverage_per_liter),
                total_liters_needed: Set(money::round_quantity(d.total_liters_needed)),
                gallons_needed: Set(money::round_quantity(d.gallons_needed)),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }
        CalculatorDetails::Gypsum(d) => {
            calculation_details::gypsum::ActiveModel {
                calculation_id: Set(calculation_id),
                area_to_cover: Set(d.area_to_cover),
                thickness: Set(d.thickness),
                gypsum_type: Set(d.gypsum_type.clone()),
                sheets_needed: Set(d.sheets_needed),
                linear_meters_profile: Set(money::round_money(d.linear_meters_profile)),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }
        CalculatorDetails::LedStrip(d) => {
            calculation_details::led_strip::ActiveModel {
                calculation_id: Set(calculation_id),
                total_length: Set(d.total_length),
                power_per_meter: Set(d.power_per_meter),
                voltage: Set(d.voltage.clone()),
                strip_type: Set(d.strip_type.clone()),
                total_power: Set(money::round_money(d.total_power)),
                drivers_needed: Set(d.drivers_needed),
                meters_per_roll: Set(d.meters_per_roll),
                rolls_needed: Set(d.rolls_needed),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }
        CalculatorDetails::Cable(d) => {
            calculation_details::cable::ActiveModel {
                calculation_id: Set(calculation_id),
                total_length: Set(money::round_quantity(d.total_length)),
                wire_gauge: Set(d.wire_gauge.clone()),
                cable_type: Set(d.cable_type.clone()),
                installation_type: Set(d.installation_type.clone()),
                rolls_needed: Set(d.rolls_needed),
                meters_per_roll: Set(d.meters_per_roll),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }
        CalculatorDetails::Putty(_) | CalculatorDetails::Profiles(_) => {}
    }
    Ok(())
}

/// Runs a calculator and persists the result.
///
/// The stored quantity is rounded to 3 decimal places and the estimated cost
/// to cents; the response carries the same rounded figures.
#[instrument(skip(db, request), fields(project_id = request.project_id, kind = %request.input.kind()))]
pub async fn run_calculation(
    db: &DatabaseConnection,
    request: CalculationRequest,
) -> Result<CalculationResult> {
    let output: CalculatorOutput = request.input.compute()?;

    let txn = db.begin().await?;
    lookup::require::<Project, _>(&txn, "Project", request.project_id).await?;
    let priced_with =
        lookup::require_optional::<Material, _>(&txn, "Material", request.material_id).await?;

    let quantity = money::round_quantity(output.quantity);
    let estimated_cost = output
        .estimated_cost(priced_with.as_ref().and_then(|m| m.reference_price))
        .map(money::round_money);

    let header = calculation::ActiveModel {
        project_id: Set(request.project_id),
        kind: Set(output.kind),
        material_id: Set(request.material_id),
        input_data: Set(serde_json::to_value(&request.input)?),
        calculated_quantity: Set(quantity),
        unit: Set(output.unit.to_string()),
        estimated_cost: Set(estimated_cost),
        detailed_results: Set(output.detailed_results.clone()),
        added_to_budget: Set(false),
        budget_item_id: Set(None),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    insert_details(&txn, header.id, &output.details).await?;

    let suggestions =
        materials::suggestions_for(&txn, output.kind, request.input.size_hint()).await?;
    txn.commit().await?;

    info!(
        calculation_id = header.id,
        quantity = %quantity,
        unit = output.unit,
        "Calculation stored"
    );

    Ok(CalculationResult {
        calculation_id: header.id,
        calculation_type: output.kind,
        calculated_quantity: quantity,
        unit: header.unit,
        estimated_cost,
        detailed_results: output.detailed_results,
        specific_details: output.details,
        material_suggestions: suggestions.into_iter().map(Into::into).collect(),
    })
}

/// Retrieves a stored calculation by id.
pub async fn get_calculation(
    db: &DatabaseConnection,
    calculation_id: i64,
) -> Result<calculation::Model> {
    lookup::require::<Calculation, _>(db, "Calculation", calculation_id).await
}

/// Calculation list filters; they combine with AND.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalculationFilter {
    /// Only this project
    pub project_id: Option<i64>,
    /// Only this calculator
    pub kind: Option<CalculatorKind>,
    /// Only runs that were or were not added to the budget
    pub added_to_budget: Option<bool>,
}

/// Lists stored calculations, newest first.
pub async fn list_calculations(
    db: &DatabaseConnection,
    filter: &CalculationFilter,
) -> Result<Vec<calculation::Model>> {
    let mut query = Calculation::find();

    if let Some(project_id) = filter.project_id {
        query = query.filter(calculation::Column::ProjectId.eq(project_id));
    }
    if let Some(kind) = filter.kind {
        query = query.filter(calculation::Column::Kind.eq(kind));
    }
    if let Some(added) = filter.added_to_budget {
        query = query.filter(calculation::Column::AddedToBudget.eq(added));
    }

    query
        .order_by_desc(calculation::Column::CreatedAt)
        .order_by_desc(calculation::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Optional overrides when turning a calculation into a budget line.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddToBudgetOptions {
    /// Price per unit, overriding the material's
    pub unit_price: Option<Decimal>,
    /// Supplier for the new line
    pub supplier_id: Option<i64>,
    /// Rooms or areas for the new line
    #[serde(default)]
    pub spaces: String,
    /// Notes replacing the generated one
    pub notes: Option<String>,
}

/// Unit price for the budget line: the override, else the material's reference
/// price, else the estimated cost per unit.
fn pick_unit_price(
    calc: &calculation::Model,
    priced_with: Option<&material::Model>,
    override_price: Option<Decimal>,
) -> Option<Decimal> {
    override_price
        .or_else(|| priced_with.and_then(|m| m.reference_price))
        .or_else(|| {
            calc.estimated_cost
                .filter(|_| calc.calculated_quantity > Decimal::ZERO)
                .map(|cost| money::round_money(cost / calc.calculated_quantity))
        })
}

/// Creates a budget line from a stored calculation.
///
/// # Errors
/// - `Error::Conflict` if the calculation was already added
/// - `Error::Validation` if no unit price can be determined
pub async fn add_to_budget(
    db: &DatabaseConnection,
    calculation_id: i64,
    options: AddToBudgetOptions,
) -> Result<budget_item::Model> {
    let txn = db.begin().await?;
    let calc = lookup::require::<Calculation, _>(&txn, "Calculation", calculation_id).await?;
    let item = link_to_budget(&txn, calc, options).await?;
    txn.commit().await?;

    info!(
        calculation_id,
        budget_item_id = item.id,
        total_price = %item.total_price,
        "Calculation added to budget"
    );
    Ok(item)
}

/// Inserts the budget line for `calc`, marks it added and recomputes the summary.
///
/// `calc` may be stale: the mark is a guarded update, so a calculation another
/// request already added yields `Error::Conflict` and the caller's transaction
/// must be dropped.
async fn link_to_budget<C>(
    txn: &C,
    calc: calculation::Model,
    options: AddToBudgetOptions,
) -> Result<budget_item::Model>
where
    C: ConnectionTrait,
{
    let calculation_id = calc.id;
    if calc.added_to_budget {
        return Err(Error::conflict(format!(
            "Calculation {calculation_id} has already been added to the budget"
        )));
    }

    let priced_with =
        lookup::require_optional::<Material, _>(txn, "Material", calc.material_id).await?;
    let unit_price = pick_unit_price(&calc, priced_with.as_ref(), options.unit_price)
        .ok_or_else(|| {
            Error::validation(format!(
                "Calculation {calculation_id} has no price; supply a unit_price"
            ))
        })?;

    let name = calc.kind.display_name();
    let input = BudgetItemInput {
        project_id: calc.project_id,
        material_id: calc.material_id,
        supplier_id: options.supplier_id,
        description: format!("{name} - {} {}", calc.calculated_quantity, calc.unit),
        category: calc.kind.budget_category(),
        spaces: options.spaces,
        quantity: calc.calculated_quantity,
        unit: calc.unit.clone(),
        unit_price,
        notes: options
            .notes
            .unwrap_or_else(|| format!("Generated from calculator: {name}")),
    };
    let item = budget::insert_budget_item(txn, input, true).await?;

    let marked = Calculation::update_many()
        .col_expr(calculation::Column::AddedToBudget, Expr::value(true))
        .col_expr(calculation::Column::BudgetItemId, Expr::value(Some(item.id)))
        .filter(calculation::Column::Id.eq(calculation_id))
        .filter(calculation::Column::AddedToBudget.eq(false))
        .exec(txn)
        .await?;
    if marked.rows_affected != 1 {
        debug!(calculation_id, "Lost race marking calculation as added");
        return Err(Error::conflict(format!(
            "Calculation {calculation_id} has already been added to the budget"
        )));
    }

    summary::update_summary(txn, calc.project_id).await?;
    Ok(item)
}
