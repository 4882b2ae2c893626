//! Closed value sets stored as string columns.
//!
//! Every enum maps to the snake_case string used both in the database and in
//! the JSON API, so a row read back from `SQLite` serializes to the same value
//! the client sent.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a budget line or an expense
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    /// Paint, gypsum, putty and other building work
    #[sea_orm(string_value = "construction")]
    Construction,
    /// Fixtures, LED strips and profiles
    #[sea_orm(string_value = "lighting")]
    Lighting,
    /// Cable and wiring
    #[sea_orm(string_value = "electrical")]
    Electrical,
    /// Installers and other services
    #[sea_orm(string_value = "labor")]
    Labor,
    /// Anything else
    #[sea_orm(string_value = "others")]
    Others,
}

impl ItemCategory {
    /// All categories in display order.
    pub const ALL: [Self; 5] = [
        Self::Construction,
        Self::Lighting,
        Self::Electrical,
        Self::Labor,
        Self::Others,
    ];

    /// Stored and serialized name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Construction => "construction",
            Self::Lighting => "lighting",
            Self::Electrical => "electrical",
            Self::Labor => "labor",
            Self::Others => "others",
        }
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalog grouping for materials
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum MaterialCategory {
    /// Construction materials
    #[sea_orm(string_value = "construction")]
    Construction,
    /// Lighting products
    #[sea_orm(string_value = "lighting")]
    Lighting,
    /// Electrical supplies
    #[sea_orm(string_value = "electrical")]
    Electrical,
    /// Plumbing supplies
    #[sea_orm(string_value = "plumbing")]
    Plumbing,
    /// Floors, tiles and other finishes
    #[sea_orm(string_value = "finishes")]
    Finishes,
    /// Anything else
    #[sea_orm(string_value = "others")]
    Others,
}

/// What a supplier mainly sells
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum SupplierType {
    /// Building materials
    #[sea_orm(string_value = "materials")]
    Materials,
    /// Lighting products
    #[sea_orm(string_value = "lighting")]
    Lighting,
    /// Electrical supplies
    #[sea_orm(string_value = "electrical")]
    Electrical,
    /// Labor and services
    #[sea_orm(string_value = "services")]
    Services,
    /// More than one of the above
    #[sea_orm(string_value = "mixed")]
    Mixed,
}

/// Kind of building a project is for
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    /// Homes and apartments
    #[sea_orm(string_value = "residential")]
    Residential,
    /// Shops, offices and restaurants
    #[sea_orm(string_value = "commercial")]
    Commercial,
    /// Schools, hospitals and public buildings
    #[sea_orm(string_value = "institutional")]
    Institutional,
    /// Plants and warehouses
    #[sea_orm(string_value = "industrial")]
    Industrial,
}

/// Lifecycle phase; advances strictly in declaration order
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum ProjectPhase {
    /// Drawing up the budget
    #[sea_orm(string_value = "design")]
    Design,
    /// Buying materials
    #[sea_orm(string_value = "purchase")]
    Purchase,
    /// Work on site
    #[sea_orm(string_value = "installation")]
    Installation,
    /// Handed over
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl ProjectPhase {
    /// The phase after this one, or `None` once completed.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Design => Some(Self::Purchase),
            Self::Purchase => Some(Self::Installation),
            Self::Installation => Some(Self::Completed),
            Self::Completed => None,
        }
    }

    /// Rough completion shown on the dashboard.
    #[must_use]
    pub const fn progress_percentage(self) -> u8 {
        match self {
            Self::Design => 25,
            Self::Purchase => 50,
            Self::Installation => 75,
            Self::Completed => 100,
        }
    }
}

/// Commercial status of a project, independent of its phase
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Not started yet
    #[sea_orm(string_value = "planning")]
    Planning,
    /// Work under way
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    /// Paused
    #[sea_orm(string_value = "on_hold")]
    OnHold,
    /// Finished
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Quoted to the client, awaiting approval
    #[sea_orm(string_value = "budget")]
    Budget,
}

/// The closed set of calculators
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum CalculatorKind {
    /// Liters of paint for an area
    #[sea_orm(string_value = "paint")]
    Paint,
    /// Gypsum board sheets and framing profile
    #[sea_orm(string_value = "gypsum")]
    Gypsum,
    /// LED strip rolls and drivers
    #[sea_orm(string_value = "led_strip")]
    LedStrip,
    /// Electrical cable with a safety margin
    #[sea_orm(string_value = "cable")]
    Cable,
    /// Putty sacks for an area
    #[sea_orm(string_value = "putty")]
    Putty,
    /// Aluminium profiles and accessory kits
    #[sea_orm(string_value = "profiles")]
    Profiles,
}

impl CalculatorKind {
    /// Stored and serialized name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Paint => "paint",
            Self::Gypsum => "gypsum",
            Self::LedStrip => "led_strip",
            Self::Cable => "cable",
            Self::Putty => "putty",
            Self::Profiles => "profiles",
        }
    }

    /// Human-readable calculator name, used in generated budget descriptions.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Paint => "Paint",
            Self::Gypsum => "Gypsum board",
            Self::LedStrip => "LED strip",
            Self::Cable => "Electrical cable",
            Self::Putty => "Wall putty",
            Self::Profiles => "Aluminium profiles",
        }
    }

    /// Ledger category a budget line spawned from this calculator lands in.
    #[must_use]
    pub const fn budget_category(self) -> ItemCategory {
        match self {
            Self::Paint | Self::Gypsum | Self::Putty => ItemCategory::Construction,
            Self::LedStrip | Self::Cable | Self::Profiles => ItemCategory::Lighting,
        }
    }

    /// Catalog category and name keyword used for material suggestions.
    #[must_use]
    pub const fn suggestion_filter(self) -> (MaterialCategory, &'static str) {
        match self {
            Self::Paint => (MaterialCategory::Construction, "paint"),
            Self::Gypsum => (MaterialCategory::Construction, "gypsum"),
            Self::Putty => (MaterialCategory::Construction, "putty"),
            Self::LedStrip => (MaterialCategory::Lighting, "led"),
            Self::Cable => (MaterialCategory::Electrical, "cable"),
            Self::Profiles => (MaterialCategory::Lighting, "profile"),
        }
    }
}

impl fmt::Display for CalculatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
