//! REST API served under `/api`.
//!
//! Handlers are thin: they extract, call into [`crate::core`], and wrap the
//! result in JSON. Errors become responses through the `IntoResponse` impl in
//! [`error`].

mod budget_items;
mod calculations;
mod error;
mod financial_summary;
mod materials;
mod projects;
mod real_expenses;
pub mod session;
mod suppliers;

use crate::{core, errors::Error, errors::Result};
use axum::{Json, Router, routing::get};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::{Value, json};
use session::SessionKey;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// Connection pool shared by every handler
    pub db: DatabaseConnection,
}

/// `?selected_project_only=true` narrows a listing to the session's project.
#[derive(Debug, Default, Deserialize)]
struct ProjectScope {
    #[serde(default)]
    selected_project_only: bool,
}

impl ProjectScope {
    async fn resolve(
        &self,
        db: &DatabaseConnection,
        session: Option<SessionKey>,
    ) -> Result<Option<i64>> {
        if !self.selected_project_only {
            return Ok(None);
        }
        let SessionKey(key) = session.ok_or_else(|| {
            Error::validation("selected_project_only requires the x-session-id header")
        })?;
        let project = core::session::require_selected_project(db, &key).await?;
        Ok(Some(project.id))
    }

    /// `explicit`, or else the session's selected project.
    async fn explicit_or_selected(
        db: &DatabaseConnection,
        explicit: Option<i64>,
        session: Option<SessionKey>,
    ) -> Result<i64> {
        if let Some(project_id) = explicit {
            return Ok(project_id);
        }
        let SessionKey(key) = session.ok_or_else(|| {
            Error::validation("project_id is required when no project is selected")
        })?;
        let project = core::session::require_selected_project(db, &key).await?;
        Ok(project.id)
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(projects::routes())
        .merge(materials::routes())
        .merge(suppliers::routes())
        .merge(budget_items::routes())
        .merge(real_expenses::routes())
        .merge(financial_summary::routes())
        .merge(calculations::routes());

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode},
    };
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::str::FromStr;
    use tower::ServiceExt;

    async fn app() -> Router {
        let db = setup_test_db().await.unwrap();
        router(AppState { db })
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
        session: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(key) = session {
            builder = builder.header(session::SESSION_HEADER, key);
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn decimal(value: &Value) -> Decimal {
        match value {
            Value::String(s) => Decimal::from_str(s).unwrap(),
            other => Decimal::from_str(&other.to_string()).unwrap(),
        }
    }

    async fn create_project(app: &Router, name: &str) -> i64 {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/projects",
            Some(json!({
                "name": name,
                "client": "Studio Norte",
                "project_type": "commercial",
                "start_date": "2024-01-15",
            })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = app().await;
        let (status, body) = send(&app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_project_selection_per_session() {
        let app = app().await;
        let first = create_project(&app, "Cafe").await;
        let second = create_project(&app, "Office").await;

        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/api/projects/{first}/select"),
            None,
            Some("tablet"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        send(
            &app,
            Method::POST,
            &format!("/api/projects/{second}/select"),
            None,
            Some("laptop"),
        )
        .await;

        let (_, tablet) = send(&app, Method::GET, "/api/projects/selected", None, Some("tablet")).await;
        let (_, laptop) = send(&app, Method::GET, "/api/projects/selected", None, Some("laptop")).await;
        assert_eq!(tablet["id"].as_i64(), Some(first));
        assert_eq!(laptop["id"].as_i64(), Some(second));
        assert_eq!(tablet["progress_percentage"], 25);

        let (status, body) = send(&app, Method::GET, "/api/projects/selected", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("x-session-id"));

        let (status, _) = send(&app, Method::GET, "/api/projects/selected", None, Some("phone")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_calculation_to_budget_flow() {
        let app = app().await;
        let project_id = create_project(&app, "Gallery").await;

        let (status, result) = send(
            &app,
            Method::POST,
            "/api/calculations/paint",
            Some(json!({
                "project_id": project_id,
                "area_to_paint": "50",
                "number_of_coats": 2,
                "coverage_per_liter": "10",
                "paint_type": "latex",
            })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(result["calculation_type"], "paint");
        assert_eq!(result["unit"], "liters");
        assert_eq!(decimal(&result["calculated_quantity"]), dec!(10.5));
        assert!(result["estimated_cost"].is_null());
        let calculation_id = result["calculation_id"].as_i64().unwrap();

        let uri = format!("/api/calculations/{calculation_id}/add-to-budget");
        let (status, _) = send(&app, Method::POST, &uri, None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let body = json!({ "unit_price": "4" });
        let (status, item) = send(&app, Method::POST, &uri, Some(body.clone()), None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(item["category"], "construction");
        assert_eq!(item["created_from_calculation"], true);
        assert_eq!(decimal(&item["total_price"]), dec!(42));

        let (status, _) = send(&app, Method::POST, &uri, Some(body), None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, summary) = send(
            &app,
            Method::GET,
            &format!("/api/financial-summary/{project_id}"),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(decimal(&summary["total_budget"]), dec!(42));
        assert_eq!(decimal(&summary["budget_construction"]), dec!(42));
        assert_eq!(summary["is_over_budget"], false);
    }

    #[tokio::test]
    async fn test_calculator_validation_is_bad_request() {
        let app = app().await;
        let project_id = create_project(&app, "Warehouse").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/calculations/led-strip",
            Some(json!({
                "project_id": project_id,
                "total_length": "0",
                "power_per_meter": "14.4",
                "voltage": "24V",
                "strip_type": "SMD5050",
            })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("total_length"));
    }

    #[tokio::test]
    async fn test_calculator_uses_selected_project() {
        let app = app().await;
        let project_id = create_project(&app, "Boutique").await;
        send(
            &app,
            Method::POST,
            &format!("/api/projects/{project_id}/select"),
            None,
            Some("tablet"),
        )
        .await;

        let body = json!({
            "total_length": "100",
            "wire_gauge": "12 AWG",
            "cable_type": "THHN",
            "installation_type": "conduit",
        });
        let (status, result) = send(
            &app,
            Method::POST,
            "/api/calculations/cable",
            Some(body.clone()),
            Some("tablet"),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(decimal(&result["calculated_quantity"]), dec!(110));

        let (_, listed) = send(
            &app,
            Method::GET,
            &format!("/api/calculations?project_id={project_id}"),
            None,
            None,
        )
        .await;
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let (status, _) = send(&app, Method::POST, "/api/calculations/cable", Some(body), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_budget_items_selected_project_only() {
        let app = app().await;
        let first = create_project(&app, "Loft").await;
        let second = create_project(&app, "Shop").await;
        for project_id in [first, second] {
            let (status, _) = send(
                &app,
                Method::POST,
                "/api/budget-items",
                Some(json!({
                    "project_id": project_id,
                    "description": "Pendant lamps",
                    "category": "lighting",
                    "quantity": "3",
                    "unit": "unit",
                    "unit_price": "45.50",
                })),
                None,
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }
        send(
            &app,
            Method::POST,
            &format!("/api/projects/{second}/select"),
            None,
            Some("tablet"),
        )
        .await;

        let (_, all) = send(&app, Method::GET, "/api/budget-items", None, None).await;
        assert_eq!(all.as_array().unwrap().len(), 2);

        let (status, scoped) = send(
            &app,
            Method::GET,
            "/api/budget-items?selected_project_only=true",
            None,
            Some("tablet"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let scoped = scoped.as_array().unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0]["project_id"].as_i64(), Some(second));
        assert_eq!(decimal(&scoped[0]["total_price"]), dec!(136.5));
    }

    #[tokio::test]
    async fn test_unknown_resources_are_not_found() {
        let app = app().await;
        for uri in [
            "/api/projects/99",
            "/api/materials/99",
            "/api/suppliers/99",
            "/api/budget-items/99",
            "/api/real-expenses/99",
            "/api/calculations/99",
            "/api/financial-summary/99",
        ] {
            let (status, body) = send(&app, Method::GET, uri, None, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert!(body["error"].is_string());
        }
    }

    #[tokio::test]
    async fn test_advance_phase_conflict_when_completed() {
        let app = app().await;
        let project_id = create_project(&app, "Atrium").await;
        let uri = format!("/api/projects/{project_id}/advance-phase");

        for expected in ["purchase", "installation", "completed"] {
            let (status, body) = send(&app, Method::POST, &uri, None, None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["current_phase"], expected);
        }
        let (_, body) = send(&app, Method::GET, &format!("/api/projects/{project_id}"), None, None).await;
        assert_eq!(body["status"], "completed");

        let (status, _) = send(&app, Method::POST, &uri, None, None).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }
}
