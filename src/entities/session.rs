//! Session entity - Per-client "current project" selection.
//!
//! Each client session keeps its own selected project, keyed by an opaque
//! session key, so two clients never overwrite each other's selection.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Session database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    /// Unique identifier for the session row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Client-provided key (the `x-session-id` header)
    #[sea_orm(unique)]
    pub session_key: String,
    /// Project chosen in this session, if any
    pub selected_project_id: Option<i64>,
    /// When the selection last changed
    pub updated_at: DateTimeUtc,
}

/// Defines the relationship to the selected project
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Project picked by the session
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::SelectedProjectId",
        to = "super::project::Column::Id",
        on_delete = "SetNull"
    )]
    SelectedProject,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SelectedProject.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
