//! `/api/budget-items` handlers.

use super::{AppState, ProjectScope, session::SessionKey};
use crate::{
    core::budget::{
        self, BatchCopyRequest, BudgetCategorySummary, BudgetItemFilter, BudgetItemInput,
        CopyOptions,
    },
    entities::{budget_item::Model as BudgetItem, real_expense::Model as RealExpense},
    errors::Result,
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

/// Routes for budget items, mounted under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/budget-items", get(list).post(create))
        .route("/budget-items/summary-by-category", get(summary_by_category))
        .route("/budget-items/copy-multiple", post(copy_multiple))
        .route("/budget-items/:id", get(show).put(update).delete(remove))
        .route("/budget-items/:id/copy-to-expense", post(copy_to_expense))
}

async fn list(
    State(state): State<AppState>,
    Query(mut filter): Query<BudgetItemFilter>,
    Query(scope): Query<ProjectScope>,
    session: Option<SessionKey>,
) -> Result<Json<Vec<BudgetItem>>> {
    if let Some(project_id) = scope.resolve(&state.db, session).await? {
        filter.project_id = Some(project_id);
    }
    budget::list_budget_items(&state.db, &filter).await.map(Json)
}

async fn create(
    State(state): State<AppState>,
    Json(input): Json<BudgetItemInput>,
) -> Result<(StatusCode, Json<BudgetItem>)> {
    let created = budget::create_budget_item(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<BudgetItem>> {
    budget::get_budget_item(&state.db, id).await.map(Json)
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<BudgetItemInput>,
) -> Result<Json<BudgetItem>> {
    budget::update_budget_item(&state.db, id, input).await.map(Json)
}

async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    budget::delete_budget_item(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn copy_to_expense(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(options): Json<CopyOptions>,
) -> Result<(StatusCode, Json<RealExpense>)> {
    let expense = budget::copy_item_to_expense(&state.db, id, options).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

#[derive(Debug, Serialize)]
struct CopyFailure {
    budget_item_id: i64,
    error: String,
}

#[derive(Debug, Serialize)]
struct BatchCopyResponse {
    created: Vec<RealExpense>,
    failures: Vec<CopyFailure>,
}

async fn copy_multiple(
    State(state): State<AppState>,
    Json(request): Json<BatchCopyRequest>,
) -> Result<Json<BatchCopyResponse>> {
    let outcome = budget::copy_multiple_to_expenses(&state.db, request).await?;
    Ok(Json(BatchCopyResponse {
        created: outcome.created,
        failures: outcome
            .failures
            .into_iter()
            .map(|(budget_item_id, error)| CopyFailure {
                budget_item_id,
                error: error.to_string(),
            })
            .collect(),
    }))
}

#[derive(Debug, Deserialize)]
struct ProjectQuery {
    project_id: Option<i64>,
}

async fn summary_by_category(
    State(state): State<AppState>,
    Query(query): Query<ProjectQuery>,
    session: Option<SessionKey>,
) -> Result<Json<BudgetCategorySummary>> {
    let project_id = ProjectScope::explicit_or_selected(&state.db, query.project_id, session).await?;
    budget::summary_by_category(&state.db, project_id)
        .await
        .map(Json)
}
