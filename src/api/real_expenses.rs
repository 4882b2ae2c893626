//! `/api/real-expenses` handlers.

use super::{AppState, ProjectScope, session::SessionKey};
use crate::{
    core::expense::{self, ExpenseCategorySummary, ExpenseDetail, ExpenseFilter, ExpenseInput},
    entities::real_expense::Model as RealExpense,
    errors::Result,
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;

/// Routes for real expenses, mounted under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/real-expenses", get(list).post(create))
        .route("/real-expenses/summary-by-category", get(summary_by_category))
        .route("/real-expenses/:id", get(show).put(update).delete(remove))
}

async fn list(
    State(state): State<AppState>,
    Query(mut filter): Query<ExpenseFilter>,
    Query(scope): Query<ProjectScope>,
    session: Option<SessionKey>,
) -> Result<Json<Vec<RealExpense>>> {
    if let Some(project_id) = scope.resolve(&state.db, session).await? {
        filter.project_id = Some(project_id);
    }
    expense::list_expenses(&state.db, &filter).await.map(Json)
}

async fn create(
    State(state): State<AppState>,
    Json(input): Json<ExpenseInput>,
) -> Result<(StatusCode, Json<RealExpense>)> {
    let created = expense::create_expense(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<ExpenseDetail>> {
    expense::get_expense_detail(&state.db, id).await.map(Json)
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<ExpenseInput>,
) -> Result<Json<RealExpense>> {
    expense::update_expense(&state.db, id, input).await.map(Json)
}

async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    expense::delete_expense(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct ProjectQuery {
    project_id: Option<i64>,
}

async fn summary_by_category(
    State(state): State<AppState>,
    Query(query): Query<ProjectQuery>,
    session: Option<SessionKey>,
) -> Result<Json<ExpenseCategorySummary>> {
    let project_id = ProjectScope::explicit_or_selected(&state.db, query.project_id, session).await?;
    expense::summary_by_category(&state.db, project_id)
        .await
        .map(Json)
}
