//! WebAPI - REST API Endpoints
//!
//! ## Responsibilities
//!
//! - HTTP surface for the map shell (session, overlay, favorites, incidents)
//! - Request validation
//! - Response formatting

mod routes;

pub use routes::create_router;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::models::HealthResponse;
use crate::state::AppState;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let store_ok = sqlx::query("SELECT 1")
        .execute(state.coordinator.cache().pool())
        .await
        .is_ok();

    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        session_active: state.session.is_active(),
        favorites_store: store_ok,
        requests_in_flight: state.requests.in_flight(),
        request_capacity: state.requests.capacity(),
    };

    Json(response)
}
