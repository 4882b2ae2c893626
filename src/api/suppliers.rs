//! `/api/suppliers` handlers.

use super::AppState;
use crate::{
    core::supplier::{
        self, PriceComparison, PriceInput, SupplierFilter, SupplierInput, SupplierStats,
    },
    entities::{supplier::Model as Supplier, supplier_price::Model as SupplierPrice},
    errors::Result,
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Routes for suppliers, mounted under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/suppliers", get(list).post(create))
        .route("/suppliers/for-budget", get(for_budget))
        .route("/suppliers/stats", get(stats))
        .route("/suppliers/compare", get(compare))
        .route("/suppliers/:id", get(show).put(update).delete(remove))
        .route("/suppliers/:id/prices", get(prices).post(add_price))
}

async fn list(
    State(state): State<AppState>,
    Query(filter): Query<SupplierFilter>,
) -> Result<Json<Vec<Supplier>>> {
    supplier::list_suppliers(&state.db, &filter).await.map(Json)
}

async fn create(
    State(state): State<AppState>,
    Json(input): Json<SupplierInput>,
) -> Result<(StatusCode, Json<Supplier>)> {
    let created = supplier::create_supplier(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Supplier>> {
    supplier::get_supplier(&state.db, id).await.map(Json)
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<SupplierInput>,
) -> Result<Json<Supplier>> {
    supplier::update_supplier(&state.db, id, input).await.map(Json)
}

async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    supplier::delete_supplier(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn for_budget(State(state): State<AppState>) -> Result<Json<Vec<Supplier>>> {
    supplier::suppliers_for_budget(&state.db).await.map(Json)
}

async fn stats(State(state): State<AppState>) -> Result<Json<SupplierStats>> {
    supplier::supplier_stats(&state.db).await.map(Json)
}

async fn prices(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<SupplierPrice>>> {
    supplier::prices_for(&state.db, id).await.map(Json)
}

async fn add_price(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<PriceInput>,
) -> Result<(StatusCode, Json<SupplierPrice>)> {
    let entry = supplier::add_price(&state.db, id, input).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[derive(Debug, Deserialize)]
struct CompareQuery {
    material_id: i64,
    quantity: Decimal,
}

async fn compare(
    State(state): State<AppState>,
    Query(query): Query<CompareQuery>,
) -> Result<Json<PriceComparison>> {
    supplier::compare_prices(&state.db, query.material_id, query.quantity)
        .await
        .map(Json)
}
