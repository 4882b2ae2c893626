//! `/api/projects` handlers.

use super::{AppState, session::SessionKey};
use crate::{
    core::{
        project::{self, ProjectDashboard, ProjectDetail, ProjectFilter, ProjectInput, ProjectStats},
        session,
    },
    errors::Result,
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};

/// Routes for projects, mounted under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/projects", get(list).post(create))
        .route("/projects/stats", get(stats))
        .route("/projects/selected", get(selected).delete(clear_selected))
        .route("/projects/:id", get(show).put(update).delete(remove))
        .route("/projects/:id/select", post(select))
        .route("/projects/:id/dashboard", get(dashboard))
        .route("/projects/:id/advance-phase", post(advance_phase))
}

fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}

async fn list(
    State(state): State<AppState>,
    Query(filter): Query<ProjectFilter>,
) -> Result<Json<Vec<ProjectDetail>>> {
    let today = today();
    let projects = project::list_projects(&state.db, &filter).await?;
    Ok(Json(
        projects
            .into_iter()
            .map(|p| ProjectDetail::new(p, today))
            .collect(),
    ))
}

async fn create(
    State(state): State<AppState>,
    Json(input): Json<ProjectInput>,
) -> Result<(StatusCode, Json<ProjectDetail>)> {
    let created = project::create_project(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(ProjectDetail::new(created, today()))))
}

async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<ProjectDetail>> {
    let found = project::get_project(&state.db, id).await?;
    Ok(Json(ProjectDetail::new(found, today())))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<ProjectInput>,
) -> Result<Json<ProjectDetail>> {
    let updated = project::update_project(&state.db, id, input).await?;
    Ok(Json(ProjectDetail::new(updated, today())))
}

async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    project::delete_project(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn select(
    State(state): State<AppState>,
    SessionKey(key): SessionKey,
    Path(id): Path<i64>,
) -> Result<Json<ProjectDetail>> {
    let chosen = session::select_project(&state.db, &key, id).await?;
    Ok(Json(ProjectDetail::new(chosen, today())))
}

async fn selected(
    State(state): State<AppState>,
    SessionKey(key): SessionKey,
) -> Result<Json<ProjectDetail>> {
    let current = session::require_selected_project(&state.db, &key).await?;
    Ok(Json(ProjectDetail::new(current, today())))
}

async fn clear_selected(
    State(state): State<AppState>,
    SessionKey(key): SessionKey,
) -> Result<StatusCode> {
    session::clear_selection(&state.db, &key).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn dashboard(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProjectDashboard>> {
    project::dashboard(&state.db, id, today()).await.map(Json)
}

async fn advance_phase(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProjectDetail>> {
    let today = today();
    let advanced = project::advance_phase(&state.db, id, today).await?;
    Ok(Json(ProjectDetail::new(advanced, today)))
}

async fn stats(State(state): State<AppState>) -> Result<Json<ProjectStats>> {
    project::project_stats(&state.db, today()).await.map(Json)
}
