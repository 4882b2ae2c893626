//! Calculator-specific detail rows, one-to-one with a calculation header.

/// Paint run details
pub mod paint {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    /// Paint detail row
    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "paint_calculations")]
    pub struct Model {
        /// Unique identifier
        #[sea_orm(primary_key)]
        pub id: i64,
        /// Calculation header this row belongs to
        #[sea_orm(unique)]
        pub calculation_id: i64,
        /// Area painted, m²
        pub area_to_paint: Decimal,
        /// Coats applied
        pub number_of_coats: i32,
        /// Finish
        pub paint_type: String,
        /// m² covered by one liter
        pub coverage_per_liter: Decimal,
        /// Liters including waste
        pub total_liters_needed: Decimal,
        /// Same quantity in US gallons
        pub gallons_needed: Decimal,
    }

    /// Relationship to the calculation header
    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        /// Each row belongs to one calculation
        #[sea_orm(
            belongs_to = "crate::entities::calculation::Entity",
            from = "Column::CalculationId",
            to = "crate::entities::calculation::Column::Id",
            on_delete = "Cascade"
        )]
        Calculation,
    }

    impl Related<crate::entities::calculation::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Calculation.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Gypsum board run details
pub mod gypsum {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    /// Gypsum detail row
    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "gypsum_calculations")]
    pub struct Model {
        /// Unique identifier
        #[sea_orm(primary_key)]
        pub id: i64,
        /// Calculation header this row belongs to
        #[sea_orm(unique)]
        pub calculation_id: i64,
        /// Area covered, m²
        pub area_to_cover: Decimal,
        /// Board thickness in millimeters
        pub thickness: Decimal,
        /// Board type
        pub gypsum_type: String,
        /// Sheets including waste
        pub sheets_needed: i64,
        /// Framing profile in linear meters
        pub linear_meters_profile: Decimal,
    }

    /// Relationship to the calculation header
    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        /// Each row belongs to one calculation
        #[sea_orm(
            belongs_to = "crate::entities::calculation::Entity",
            from = "Column::CalculationId",
            to = "crate::entities::calculation::Column::Id",
            on_delete = "Cascade"
        )]
        Calculation,
    }

    impl Related<crate::entities::calculation::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Calculation.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// LED strip run details
pub mod led_strip {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    /// LED strip detail row
    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "led_strip_calculations")]
    pub struct Model {
        /// Unique identifier
        #[sea_orm(primary_key)]
        pub id: i64,
        /// Calculation header this row belongs to
        #[sea_orm(unique)]
        pub calculation_id: i64,
        /// Strip length, m
        pub total_length: Decimal,
        /// Consumption, W/m
        pub power_per_meter: Decimal,
        /// e.g. `"12V"`, `"24V"`
        pub voltage: String,
        /// e.g. `"SMD5050"`, `"COB"`
        pub strip_type: String,
        /// Total load, W
        pub total_power: Decimal,
        /// Drivers with the 80% load derating applied
        pub drivers_needed: i64,
        /// Length of one roll, m
        pub meters_per_roll: Decimal,
        /// Rolls to buy
        pub rolls_needed: i64,
    }

    /// Relationship to the calculation header
    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        /// Each row belongs to one calculation
        #[sea_orm(
            belongs_to = "crate::entities::calculation::Entity",
            from = "Column::CalculationId",
            to = "crate::entities::calculation::Column::Id",
            on_delete = "Cascade"
        )]
        Calculation,
    }

    impl Related<crate::entities::calculation::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Calculation.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Electrical cable run details
pub mod cable {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    /// Cable detail row
    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "cable_calculations")]
    pub struct Model {
        /// Unique identifier
        #[sea_orm(primary_key)]
        pub id: i64,
        /// Calculation header this row belongs to
        #[sea_orm(unique)]
        pub calculation_id: i64,
        /// Length including the safety margin
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

    /// Relationship to the calculation header
    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        /// Each row belongs to one calculation
        #[sea_orm(
            belongs_to = "crate::entities::calculation::Entity",
            from = "Column::CalculationId",
            to = "crate::entities::calculation::Column::Id",
            on_delete = "Cascade"
        )]
        Calculation,
    }

    impl Related<crate::entities::calculation::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Calculation.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}
