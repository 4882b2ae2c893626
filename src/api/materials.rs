//! `/api/materials` handlers.

use super::AppState;
use crate::{
    core::material::{
        self, MaterialFilter, MaterialGroup, MaterialInput, QuantityEstimate, SupplierOffer,
    },
    entities::{MaterialCategory, material::Model as Material},
    errors::Result,
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Routes for materials, mounted under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/materials", get(list).post(create))
        .route("/materials/by-category", get(by_category))
        .route("/materials/for-calculator", get(for_calculator))
        .route("/materials/:id", get(show).put(update).delete(remove))
        .route("/materials/:id/suppliers", get(suppliers))
        .route("/materials/:id/calculate-quantity", post(calculate_quantity))
}

async fn list(
    State(state): State<AppState>,
    Query(filter): Query<MaterialFilter>,
) -> Result<Json<Vec<Material>>> {
    material::list_materials(&state.db, &filter).await.map(Json)
}

async fn create(
    State(state): State<AppState>,
    Json(input): Json<MaterialInput>,
) -> Result<(StatusCode, Json<Material>)> {
    let created = material::create_material(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Material>> {
    material::get_material(&state.db, id).await.map(Json)
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<MaterialInput>,
) -> Result<Json<Material>> {
    material::update_material(&state.db, id, input).await.map(Json)
}

async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    material::delete_material(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn by_category(State(state): State<AppState>) -> Result<Json<Vec<MaterialGroup>>> {
    material::materials_by_category(&state.db).await.map(Json)
}

#[derive(Debug, Deserialize)]
struct CategoryQuery {
    category: MaterialCategory,
}

async fn for_calculator(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<Vec<Material>>> {
    material::materials_for_calculator(&state.db, query.category)
        .await
        .map(Json)
}

async fn suppliers(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<SupplierOffer>>> {
    material::suppliers_for(&state.db, id).await.map(Json)
}

const fn one_layer() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct QuantityRequest {
    area_or_length: Decimal,
    #[serde(default = "one_layer")]
    layers: u32,
}

async fn calculate_quantity(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<QuantityRequest>,
) -> Result<Json<QuantityEstimate>> {
    material::calculate_quantity(&state.db, id, request.area_or_length, request.layers)
        .await
        .map(Json)
}
