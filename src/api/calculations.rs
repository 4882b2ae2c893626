//! `/api/calculations` handlers.
//!
//! Every calculator endpoint takes the calculator's own fields plus
//! `project_id` and an optional `material_id`. Without `project_id` the
//! session's selected project is used.

use super::{AppState, ProjectScope, session::SessionKey};
use crate::{
    core::{
        calculation::{
            self, AddToBudgetOptions, CalculationFilter, CalculationRequest, CalculationResult,
        },
        calculator::{
            CableInput, CalculatorInput, GypsumInput, LedStripInput, PaintInput, ProfilesInput,
            PuttyInput,
        },
    },
    entities::{budget_item::Model as BudgetItem, calculation::Model as Calculation},
    errors::Result,
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;

/// Routes for calculations, mounted under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/calculations", get(list))
        .route("/calculations/paint", post(paint))
        .route("/calculations/gypsum", post(gypsum))
        .route("/calculations/led-strip", post(led_strip))
        .route("/calculations/cable", post(cable))
        .route("/calculations/putty", post(putty))
        .route("/calculations/profiles", post(profiles))
        .route("/calculations/:id", get(show))
        .route("/calculations/:id/add-to-budget", post(add_to_budget))
}

/// Calculator body: the target project and material around the calculator fields.
#[derive(Debug, Deserialize)]
struct RunBody<T> {
    project_id: Option<i64>,
    material_id: Option<i64>,
    #[serde(flatten)]
    input: T,
}

async fn run<T>(
    state: &AppState,
    session: Option<SessionKey>,
    body: RunBody<T>,
    wrap: fn(T) -> CalculatorInput,
) -> Result<(StatusCode, Json<CalculationResult>)> {
    let project_id = ProjectScope::explicit_or_selected(&state.db, body.project_id, session).await?;
    let request = CalculationRequest {
        project_id,
        material_id: body.material_id,
        input: wrap(body.input),
    };
    let result = calculation::run_calculation(&state.db, request).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

async fn paint(
    State(state): State<AppState>,
    session: Option<SessionKey>,
    Json(body): Json<RunBody<PaintInput>>,
) -> Result<(StatusCode, Json<CalculationResult>)> {
    run(&state, session, body, CalculatorInput::Paint).await
}

async fn gypsum(
    State(state): State<AppState>,
    session: Option<SessionKey>,
    Json(body): Json<RunBody<GypsumInput>>,
) -> Result<(StatusCode, Json<CalculationResult>)> {
    run(&state, session, body, CalculatorInput::Gypsum).await
}

async fn led_strip(
    State(state): State<AppState>,
    session: Option<SessionKey>,
    Json(body): Json<RunBody<LedStripInput>>,
) -> Result<(StatusCode, Json<CalculationResult>)> {
    run(&state, session, body, CalculatorInput::LedStrip).await
}

async fn cable(
    State(state): State<AppState>,
    session: Option<SessionKey>,
    Json(body): Json<RunBody<CableInput>>,
) -> Result<(StatusCode, Json<CalculationResult>)> {
    run(&state, session, body, CalculatorInput::Cable).await
}

async fn putty(
    State(state): State<AppState>,
    session: Option<SessionKey>,
    Json(body): Json<RunBody<PuttyInput>>,
) -> Result<(StatusCode, Json<CalculationResult>)> {
    run(&state, session, body, CalculatorInput::Putty).await
}

async fn profiles(
    State(state): State<AppState>,
    session: Option<SessionKey>,
    Json(body): Json<RunBody<ProfilesInput>>,
) -> Result<(StatusCode, Json<CalculationResult>)> {
    run(&state, session, body, CalculatorInput::Profiles).await
}

async fn list(
    State(state): State<AppState>,
    Query(filter): Query<CalculationFilter>,
) -> Result<Json<Vec<Calculation>>> {
    calculation::list_calculations(&state.db, &filter)
        .await
        .map(Json)
}

async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Calculation>> {
    calculation::get_calculation(&state.db, id).await.map(Json)
}

async fn add_to_budget(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    options: Option<Json<AddToBudgetOptions>>,
) -> Result<(StatusCode, Json<BudgetItem>)> {
    let options = options.map(|Json(o)| o).unwrap_or_default();
    let item = calculation::add_to_budget(&state.db, id, options).await?;
    Ok((StatusCode::CREATED, Json(item)))
}
