//! `/api/financial-summary` handlers.

use super::{AppState, session::SessionKey};
use crate::{
    core::{
        session,
        summary::{self, SummaryReport},
    },
    errors::Result,
};
use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};

/// Routes for financial summary, mounted under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/financial-summary/selected", get(selected))
        .route("/financial-summary/:project_id", get(show))
        .route("/financial-summary/:project_id/refresh", post(refresh))
}

async fn show(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
) -> Result<Json<SummaryReport>> {
    let row = summary::get_or_create_summary(&state.db, project_id).await?;
    Ok(Json(SummaryReport::from(row)))
}

async fn refresh(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
) -> Result<Json<SummaryReport>> {
    let row = summary::refresh_summary(&state.db, project_id).await?;
    Ok(Json(SummaryReport::from(row)))
}

async fn selected(
    State(state): State<AppState>,
    SessionKey(key): SessionKey,
) -> Result<Json<SummaryReport>> {
    let project = session::require_selected_project(&state.db, &key).await?;
    let row = summary::get_or_create_summary(&state.db, project.id).await?;
    Ok(Json(SummaryReport::from(row)))
}
