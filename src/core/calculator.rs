//! Quantity calculators.
//!
//! Each calculator turns physical measurements into a purchase quantity and a
//! cost basis (the count the material's reference price applies to: liters,
//! sheets, rolls, sacks or profiles). Everything here is pure: no database,
//! no rounding. Persistence and rounding happen in
//! [`crate::core::calculation`].

use crate::{
    core::money::ceil_count,
    entities::CalculatorKind,
    errors::{Error, Result},
};
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Extra paint bought for spills and touch-ups
const PAINT_WASTE: Decimal = dec!(0.05);
const LITERS_PER_GALLON: Decimal = dec!(3.785);
/// One 1.22 m × 2.44 m board
const GYPSUM_SHEET_AREA: Decimal = dec!(2.9768);
const GYPSUM_WASTE: Decimal = dec!(0.10);
/// One stud every 60 cm
const GYPSUM_STUD_SPACING: Decimal = dec!(0.6);
const DRIVER_WATTS: Decimal = dec!(60);
/// Drivers are loaded to at most 80% of their rating
const DRIVER_LOAD_FACTOR: Decimal = dec!(0.8);
const CABLE_SAFETY: Decimal = dec!(0.10);
const PUTTY_WASTE: Decimal = dec!(0.15);
const PUTTY_KG_PER_SACK: Decimal = dec!(20);
const PROFILE_WASTE: Decimal = dec!(0.10);
const PROFILE_STANDARD_LENGTH: Decimal = dec!(2.0);

/// Upper bound accepted for any measurement
const MAX_MEASURE: Decimal = dec!(99999999.99);
const MAX_COATS: u32 = 10;

fn default_led_meters_per_roll() -> Decimal {
    dec!(5)
}

fn default_cable_meters_per_roll() -> Decimal {
    dec!(100)
}

fn default_putty_coverage() -> Decimal {
    dec!(4)
}

const fn default_coats() -> u32 {
    1
}

/// Measurements for the paint calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaintInput {
    /// m²
    pub area_to_paint: Decimal,
    /// Coats to apply, 1 to 10
    pub number_of_coats: u32,
    /// m² covered by one liter
    pub coverage_per_liter: Decimal,
    /// Finish, e.g. "latex"
    pub paint_type: String,
}

/// Measurements for the gypsum board calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GypsumInput {
    /// m²
    pub area_to_cover: Decimal,
    /// mm
    pub thickness: Decimal,
    /// Board type, e.g. "standard" or "moisture resistant"
    pub gypsum_type: String,
}

/// Measurements for the LED strip calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedStripInput {
    /// m
    pub total_length: Decimal,
    /// W/m
    pub power_per_meter: Decimal,
    /// Supply voltage, e.g. "24V"
    pub voltage: String,
    /// Strip model, e.g. "SMD5050"
    pub strip_type: String,
    /// Length of one roll in meters, at least 0.01
    #[serde(default = "default_led_meters_per_roll")]
    pub meters_per_roll: Decimal,
}

/// Measurements for the cable calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CableInput {
    /// m, before the safety margin
    pub total_length: Decimal,
    /// Gauge, e.g. "12 AWG"
    pub wire_gauge: String,
    /// Insulation type, e.g. "THHN"
    pub cable_type: String,
    /// Where it runs, e.g. "conduit"
    pub installation_type: String,
    /// Length of one roll in meters, at least 0.01
    #[serde(default = "default_cable_meters_per_roll")]
    pub meters_per_roll: Decimal,
}

/// Measurements for the putty calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PuttyInput {
    /// m²
    pub area_to_cover: Decimal,
    /// Interior or exterior putty
    pub putty_type: String,
    /// Coats to apply, 1 to 10
    #[serde(default = "default_coats")]
    pub number_of_coats: u32,
    /// m² covered by one kg
    #[serde(default = "default_putty_coverage")]
    pub coverage_per_kg: Decimal,
}

/// How many fittings go with a set of profiles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessoryKit {
    /// One fitting per two profiles
    #[default]
    Basic,
    /// One fitting per profile
    Complete,
}

/// Measurements for the aluminium profile calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfilesInput {
    /// m, before waste
    pub total_length: Decimal,
    /// Mounting, e.g. "surface" or "recessed"
    pub profile_type: String,
    /// Used to narrow material suggestions (e.g. `"16mm"`)
    pub profile_size: String,
    /// Surface finish
    pub finish_type: String,
    /// Fittings to include
    #[serde(default)]
    pub accessories: AccessoryKit,
}

/// Input for one calculator run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CalculatorInput {
    /// Paint
    Paint(PaintInput),
    /// Gypsum board
    Gypsum(GypsumInput),
    /// LED strip
    LedStrip(LedStripInput),
    /// Electrical cable
    Cable(CableInput),
    /// Wall putty
    Putty(PuttyInput),
    /// Aluminium profiles
    Profiles(ProfilesInput),
}

/// Stored figures of a paint run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaintDetails {
    /// Area painted, m²
    pub area_to_paint: Decimal,
    /// Coats applied
    pub number_of_coats: u32,
    /// Finish
    pub paint_type: String,
    /// m² covered by one liter
    pub coverage_per_liter: Decimal,
    /// Liters including waste
    pub total_liters_needed: Decimal,
    /// Same quantity in US gallons
    pub gallons_needed: Decimal,
}

/// Stored figures of a gypsum run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GypsumDetails {
    /// Area covered, m²
    pub area_to_cover: Decimal,
    /// Board thickness, mm
    pub thickness: Decimal,
    /// Board type
    pub gypsum_type: String,
    /// Sheets before waste
    pub sheets_base: i64,
    /// Sheets including waste
    pub sheets_needed: i64,
    /// Framing profile in linear meters
    pub linear_meters_profile: Decimal,
}

/// Stored figures of an LED strip run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedStripDetails {
    /// Strip length, m
    pub total_length: Decimal,
    /// Consumption, W/m
    pub power_per_meter: Decimal,
    /// Supply voltage
    pub voltage: String,
    /// Strip model
    pub strip_type: String,
    /// Total load, W
    pub total_power: Decimal,
    /// Drivers at full load, for reference only
    pub drivers_basic: i64,
    /// Drivers with the load factor applied
    pub drivers_needed: i64,
    /// Length of one roll, m
    pub meters_per_roll: Decimal,
    /// Rolls to buy
    pub rolls_needed: i64,
}

/// Stored figures of a cable run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CableDetails {
    /// Length including the safety margin, m
    pub total_length: Decimal,
    /// Gauge
    pub wire_gauge: String,
    /// Insulation type
    pub cable_type: String,
    /// Where it runs
    pub installation_type: String,
    /// Rolls to buy
    pub rolls_needed: i64,
    /// Length of one roll, m
    pub meters_per_roll: Decimal,
}

/// Figures of a putty run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PuttyDetails {
    /// Area covered, m²
    pub area_to_cover: Decimal,
    /// Interior or exterior putty
    pub putty_type: String,
    /// Coats applied
    pub number_of_coats: u32,
    /// m² covered by one kg
    pub coverage_per_kg: Decimal,
    /// Kilograms including waste
    pub kg_needed: Decimal,
    /// Sacks to buy
    pub sacks_needed: i64,
}

/// Figures of a profile run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfilesDetails {
    /// Length before waste, m
    pub total_length: Decimal,
    /// Mounting
    pub profile_type: String,
    /// Profile size
    pub profile_size: String,
    /// Surface finish
    pub finish_type: String,
    /// Profiles to buy
    pub profiles_needed: i64,
    /// Fittings to buy
    pub accessories_count: i64,
}

/// Calculator-specific figures, returned to clients as `specific_details`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CalculatorDetails {
    /// Paint figures
    Paint(PaintDetails),
    /// Gypsum figures
    Gypsum(GypsumDetails),
    /// LED strip figures
    LedStrip(LedStripDetails),
    /// Cable figures
    Cable(CableDetails),
    /// Putty figures
    Putty(PuttyDetails),
    /// Profile figures
    Profiles(ProfilesDetails),
}

/// Full-precision result of a calculator run.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatorOutput {
    /// Calculator that produced it
    pub kind: CalculatorKind,
    /// Quantity recorded on the calculation and used for a budget line
    pub quantity: Decimal,
    /// Unit of `quantity`
    pub unit: &'static str,
    /// Count the material's reference price is multiplied by
    pub cost_basis: Decimal,
    /// Intermediate figures
    pub detailed_results: serde_json::Value,
    /// Calculator-specific figures
    pub details: CalculatorDetails,
}

impl CalculatorOutput {
    /// `cost_basis × reference_price`, when a price is known.
    #[must_use]
    pub fn estimated_cost(&self, reference_price: Option<Decimal>) -> Option<Decimal> {
        reference_price.map(|price| self.cost_basis * price)
    }
}

fn at_least(field: &str, value: Decimal, min: Decimal) -> Result<()> {
    if value < min {
        return Err(Error::validation(format!(
            "{field} must be at least {min} (got {value})"
        )));
    }
    if value > MAX_MEASURE {
        return Err(Error::validation(format!(
            "{field} must be at most {MAX_MEASURE} (got {value})"
        )));
    }
    Ok(())
}

fn coats(field: &str, value: u32) -> Result<()> {
    if !(1..=MAX_COATS).contains(&value) {
        return Err(Error::validation(format!(
            "{field} must be between 1 and {MAX_COATS} (got {value})"
        )));
    }
    Ok(())
}

fn required(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{field} is required")));
    }
    Ok(())
}

impl PaintInput {
    fn validate(&self) -> Result<()> {
        at_least("area_to_paint", self.area_to_paint, dec!(0.01))?;
        coats("number_of_coats", self.number_of_coats)?;
        at_least("coverage_per_liter", self.coverage_per_liter, dec!(0.1))?;
        required("paint_type", &self.paint_type)
    }

    fn compute(&self) -> CalculatorOutput {
        let total_area = self.area_to_paint * Decimal::from(self.number_of_coats);
        let base_liters = total_area / self.coverage_per_liter;
        let liters = base_liters * (Decimal::ONE + PAINT_WASTE);
        let gallons = liters / LITERS_PER_GALLON;

        CalculatorOutput {
            kind: CalculatorKind::Paint,
            quantity: liters,
            unit: "liters",
            cost_basis: liters,
            detailed_results: json!({
                "total_area": total_area,
                "base_liters_needed": base_liters,
                "waste_factor_applied": PAINT_WASTE,
                "gallons_equivalent": gallons,
            }),
            details: CalculatorDetails::Paint(PaintDetails {
                area_to_paint: self.area_to_paint,
                number_of_coats: self.number_of_coats,
                paint_type: self.paint_type.clone(),
                coverage_per_liter: self.coverage_per_liter,
                total_liters_needed: liters,
                gallons_needed: gallons,
            }),
        }
    }
}

impl GypsumInput {
    fn validate(&self) -> Result<()> {
        at_least("area_to_cover", self.area_to_cover, dec!(0.01))?;
        at_least("thickness", self.thickness, dec!(1.0))?;
        required("gypsum_type", &self.gypsum_type)
    }

    fn compute(&self) -> Result<CalculatorOutput> {
        let sheets_base = ceil_count(self.area_to_cover / GYPSUM_SHEET_AREA)?;
        let sheets = ceil_count(Decimal::from(sheets_base) * (Decimal::ONE + GYPSUM_WASTE))?;

        // Perimeter of a square room with twice the covered area, plus studs.
        let perimeter = (dec!(2) * self.area_to_cover)
            .sqrt()
            .map(|side| dec!(2) * side)
            .ok_or_else(|| Error::validation("area_to_cover has no square root"))?;
        let profile_meters = perimeter + self.area_to_cover / GYPSUM_STUD_SPACING;

        Ok(CalculatorOutput {
            kind: CalculatorKind::Gypsum,
            quantity: Decimal::from(sheets),
            unit: "sheets",
            cost_basis: Decimal::from(sheets),
            detailed_results: json!({
                "sheet_area": GYPSUM_SHEET_AREA,
                "sheets_base": sheets_base,
                "waste_factor_applied": GYPSUM_WASTE,
                "linear_meters_profile": profile_meters,
            }),
            details: CalculatorDetails::Gypsum(GypsumDetails {
                area_to_cover: self.area_to_cover,
                thickness: self.thickness,
                gypsum_type: self.gypsum_type.clone(),
                sheets_base,
                sheets_needed: sheets,
                linear_meters_profile: profile_meters,
            }),
        })
    }
}

impl LedStripInput {
    fn validate(&self) -> Result<()> {
        at_least("total_length", self.total_length, dec!(0.01))?;
        at_least("power_per_meter", self.power_per_meter, dec!(0.1))?;
        at_least("meters_per_roll", self.meters_per_roll, dec!(0.01))?;
        required("voltage", &self.voltage)?;
        required("strip_type", &self.strip_type)
    }

    fn compute(&self) -> Result<CalculatorOutput> {
        let total_power = self.total_length * self.power_per_meter;
        let rolls = ceil_count(self.total_length / self.meters_per_roll)?;
        let drivers_basic = ceil_count(total_power / DRIVER_WATTS)?;
        let drivers = ceil_count(total_power / (DRIVER_WATTS * DRIVER_LOAD_FACTOR))?;

        Ok(CalculatorOutput {
            kind: CalculatorKind::LedStrip,
            quantity: self.total_length,
            unit: "meters",
            cost_basis: Decimal::from(rolls),
            detailed_results: json!({
                "total_power": total_power,
                "rolls_needed": rolls,
                "drivers_basic": drivers_basic,
                "drivers_with_safety": drivers,
                "safety_factor_applied": DRIVER_LOAD_FACTOR,
            }),
            details: CalculatorDetails::LedStrip(LedStripDetails {
                total_length: self.total_length,
                power_per_meter: self.power_per_meter,
                voltage: self.voltage.clone(),
                strip_type: self.strip_type.clone(),
                total_power,
                drivers_basic,
                drivers_needed: drivers,
                meters_per_roll: self.meters_per_roll,
                rolls_needed: rolls,
            }),
        })
    }
}

impl CableInput {
    fn validate(&self) -> Result<()> {
        at_least("total_length", self.total_length, dec!(0.01))?;
        at_least("meters_per_roll", self.meters_per_roll, dec!(0.01))?;
        required("wire_gauge", &self.wire_gauge)?;
        required("cable_type", &self.cable_type)?;
        required("installation_type", &self.installation_type)
    }

    fn compute(&self) -> Result<CalculatorOutput> {
        let length = self.total_length * (Decimal::ONE + CABLE_SAFETY);
        let rolls = ceil_count(length / self.meters_per_roll)?;

        Ok(CalculatorOutput {
            kind: CalculatorKind::Cable,
            quantity: length,
            unit: "meters",
            cost_basis: Decimal::from(rolls),
            detailed_results: json!({
                "base_length": self.total_length,
                "safety_factor_applied": CABLE_SAFETY,
                "rolls_needed": rolls,
                "total_meters_purchased": Decimal::from(rolls) * self.meters_per_roll,
            }),
            details: CalculatorDetails::Cable(CableDetails {
                total_length: length,
                wire_gauge: self.wire_gauge.clone(),
                cable_type: self.cable_type.clone(),
                installation_type: self.installation_type.clone(),
                rolls_needed: rolls,
                meters_per_roll: self.meters_per_roll,
            }),
        })
    }
}

impl PuttyInput {
    fn validate(&self) -> Result<()> {
        at_least("area_to_cover", self.area_to_cover, dec!(0.01))?;
        coats("number_of_coats", self.number_of_coats)?;
        at_least("coverage_per_kg", self.coverage_per_kg, dec!(0.01))?;
        required("putty_type", &self.putty_type)
    }

    fn compute(&self) -> Result<CalculatorOutput> {
        let base_kg =
            self.area_to_cover * Decimal::from(self.number_of_coats) / self.coverage_per_kg;
        let kg = base_kg * (Decimal::ONE + PUTTY_WASTE);
        let sacks = ceil_count(kg / PUTTY_KG_PER_SACK)?;

        Ok(CalculatorOutput {
            kind: CalculatorKind::Putty,
            quantity: kg,
            unit: "kg",
            cost_basis: Decimal::from(sacks),
            detailed_results: json!({
                "area_to_cover": self.area_to_cover,
                "kg_base": base_kg,
                "waste_factor_applied": PUTTY_WASTE,
                "sacks_needed": sacks,
                "kg_per_sack": PUTTY_KG_PER_SACK,
            }),
            details: CalculatorDetails::Putty(PuttyDetails {
                area_to_cover: self.area_to_cover,
                putty_type: self.putty_type.clone(),
                number_of_coats: self.number_of_coats,
                coverage_per_kg: self.coverage_per_kg,
                kg_needed: kg,
                sacks_needed: sacks,
            }),
        })
    }
}

impl ProfilesInput {
    fn validate(&self) -> Result<()> {
        at_least("total_length", self.total_length, dec!(0.01))?;
        required("profile_type", &self.profile_type)?;
        required("profile_size", &self.profile_size)?;
        required("finish_type", &self.finish_type)
    }

    fn compute(&self) -> Result<CalculatorOutput> {
        let length = self.total_length * (Decimal::ONE + PROFILE_WASTE);
        let profiles = ceil_count(length / PROFILE_STANDARD_LENGTH)?;
        let accessories = match self.accessories {
            AccessoryKit::Complete => profiles,
            AccessoryKit::Basic => ceil_count(Decimal::from(profiles) / dec!(2))?,
        };

        Ok(CalculatorOutput {
            kind: CalculatorKind::Profiles,
            quantity: length,
            unit: "meters",
            cost_basis: Decimal::from(profiles),
            detailed_results: json!({
                "base_length": self.total_length,
                "waste_factor_applied": PROFILE_WASTE,
                "profiles_needed": profiles,
                "standard_length": PROFILE_STANDARD_LENGTH,
                "accessories_count": accessories,
            }),
            details: CalculatorDetails::Profiles(ProfilesDetails {
                total_length: length,
                profile_type: self.profile_type.clone(),
                profile_size: self.profile_size.clone(),
                finish_type: self.finish_type.clone(),
                profiles_needed: profiles,
                accessories_count: accessories,
            }),
        })
    }
}

impl CalculatorInput {
    /// Calculator this input is for.
    #[must_use]
    pub const fn kind(&self) -> CalculatorKind {
        match self {
            Self::Paint(_) => CalculatorKind::Paint,
            Self::Gypsum(_) => CalculatorKind::Gypsum,
            Self::LedStrip(_) => CalculatorKind::LedStrip,
            Self::Cable(_) => CalculatorKind::Cable,
            Self::Putty(_) => CalculatorKind::Putty,
            Self::Profiles(_) => CalculatorKind::Profiles,
        }
    }

    /// Checks ranges and required fields without computing anything.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Paint(input) => input.validate(),
            Self::Gypsum(input) => input.validate(),
            Self::LedStrip(input) => input.validate(),
            Self::Cable(input) => input.validate(),
            Self::Putty(input) => input.validate(),
            Self::Profiles(input) => input.validate(),
        }
    }

    /// Validates the input and runs the calculator.
    pub fn compute(&self) -> Result<CalculatorOutput> {
        self.validate()?;
        match self {
            Self::Paint(input) => Ok(input.compute()),
            Self::Gypsum(input) => input.compute(),
            Self::LedStrip(input) => input.compute(),
            Self::Cable(input) => input.compute(),
            Self::Putty(input) => input.compute(),
            Self::Profiles(input) => input.compute(),
        }
    }

    /// Extra name filter for material suggestions, when the input has one.
    #[must_use]
    pub fn size_hint(&self) -> Option<&str> {
        match self {
            Self::Profiles(input) => Some(input.profile_size.as_str()),
            _ => None,
        }
    }
}
