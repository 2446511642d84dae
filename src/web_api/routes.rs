//! API Routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{ApiResponse, FavoriteState};
use crate::overlay::FilterConfiguration;
use crate::remote_api::{NewIncident, NewUser, ProfileUpdate, FALLBACK_INCIDENT_TYPES};
use crate::session::Session;
use crate::state::AppState;
use crate::sync_coordinator::{ResyncOutcome, ToggleNotice};

/// Create API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(super::health_check))
        // Session
        .route("/api/session/login", post(login))
        .route("/api/session/logout", post(logout))
        .route("/api/session/profile", put(update_profile))
        // Accounts
        .route("/api/users", post(register))
        // Overlay
        .route("/api/overlay", get(get_overlay))
        .route("/api/overlay/refresh", post(refresh_overlay))
        .route("/api/overlay/filters", put(update_filters))
        // Favorites
        .route("/api/cameras/:id/favorite", post(toggle_favorite))
        .route("/api/favorites", get(list_favorites))
        .route("/api/favorites/:local_id", delete(remove_favorite))
        // Incidents
        .route("/api/incidents/types", get(incident_types))
        .route("/api/incidents", post(create_incident))
        .with_state(state)
}

// ========================================
// Session Handlers
// ========================================

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    session: Session,
    resync: ResyncOutcome,
}

/// Login, then mirror the user's remote favorites locally
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    if req.username.trim().is_empty() || req.password.is_empty() {
        return Err(Error::Validation("username and password are required".to_string()));
    }

    let session = state.remote.login(req.username.trim(), &req.password).await?;
    let resync = state
        .coordinator
        .resync_on_login(session.user_id, &session.token)
        .await?;

    // The map session refreshes on the session change
    state.session.begin(session.clone());

    Ok(Json(ApiResponse::success(LoginResponse { session, resync })))
}

async fn logout(State(state): State<AppState>) -> Result<impl IntoResponse> {
    if let Some(session) = state.session.end() {
        state.coordinator.logout(session.user_id).await?;
    }
    Ok(Json(ApiResponse::success(serde_json::json!({ "logged_out": true }))))
}

#[derive(Debug, Deserialize)]
struct ProfileRequest {
    first_name: String,
    email: String,
    phone: String,
    /// Blank keeps the current password
    #[serde(default)]
    password: Option<String>,
}

/// Update the signed-in user's profile
async fn update_profile(
    State(state): State<AppState>,
    Json(req): Json<ProfileRequest>,
) -> Result<impl IntoResponse> {
    let session = state.session.require()?;
    require_fields(&[
        ("first_name", &req.first_name),
        ("email", &req.email),
        ("phone", &req.phone),
    ])?;

    let update = ProfileUpdate {
        first_name: req.first_name.trim().to_string(),
        email: req.email.trim().to_string(),
        phone: parse_phone(&req.phone)?,
        password: req
            .password
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty()),
    };

    let profile = state
        .remote
        .update_profile(&session.token, session.user_id, &update)
        .await?;
    tracing::info!(user_id = session.user_id, "Profile updated");

    Ok(Json(ApiResponse::success(profile)))
}

// ========================================
// Account Handlers
// ========================================

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    username: String,
    password: String,
    email: String,
    first_name: String,
    last_name: String,
    phone: String,
}

/// Create a regular account on the remote API
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    require_fields(&[
        ("username", &req.username),
        ("password", &req.password),
        ("email", &req.email),
        ("first_name", &req.first_name),
        ("last_name", &req.last_name),
        ("phone", &req.phone),
    ])?;

    let user = NewUser {
        username: req.username.trim().to_string(),
        password: req.password.trim().to_string(),
        email: req.email.trim().to_string(),
        first_name: req.first_name.trim().to_string(),
        last_name: req.last_name.trim().to_string(),
        phone: parse_phone(&req.phone)?,
    };

    state.remote.register(&user).await?;
    tracing::info!(username = %user.username, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(serde_json::json!({ "username": user.username }))),
    ))
}

fn require_fields(fields: &[(&str, &String)]) -> Result<()> {
    match fields.iter().find(|(_, v)| v.trim().is_empty()) {
        Some((field, _)) => Err(Error::Validation(format!("{} is required", field))),
        None => Ok(()),
    }
}

fn parse_phone(raw: &str) -> Result<i64> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Validation("invalid phone number".to_string()))
}

// ========================================
// Overlay Handlers
// ========================================

async fn get_overlay(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let snapshot = state.map.overlay().await?;
    Ok(Json(ApiResponse::success(snapshot)))
}

async fn refresh_overlay(State(state): State<AppState>) -> Result<impl IntoResponse> {
    state.map.refresh().await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::success(serde_json::json!({ "refreshing": true }))),
    ))
}

async fn update_filters(
    State(state): State<AppState>,
    Json(filter): Json<FilterConfiguration>,
) -> Result<impl IntoResponse> {
    state.map.set_filter(filter).await?;
    Ok((StatusCode::ACCEPTED, Json(ApiResponse::success(filter))))
}

// ========================================
// Favorites Handlers
// ========================================

/// Toggle a camera's favorite flag from the map
async fn toggle_favorite(
    State(state): State<AppState>,
    Path(camera_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let outcome = state.map.toggle_favorite(camera_id).await?;

    let response = match &outcome.notice {
        ToggleNotice::Failed { message } => (
            StatusCode::BAD_GATEWAY,
            Json(ApiResponse {
                ok: false,
                data: Some(outcome.clone()),
                error: Some(message.clone()),
            }),
        ),
        ToggleNotice::InFlight => (
            StatusCode::CONFLICT,
            Json(ApiResponse {
                ok: false,
                data: Some(outcome.clone()),
                error: Some("Favorite toggle already in progress".to_string()),
            }),
        ),
        ToggleNotice::Synced | ToggleNotice::SavedOffline => {
            (StatusCode::OK, Json(ApiResponse::success(outcome.clone())))
        }
    };

    Ok(response)
}

async fn list_favorites(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let session = state.session.require()?;
    let favorites = state.coordinator.favorites(session.user_id).await?;
    Ok(Json(ApiResponse::success(favorites)))
}

/// Favorites-list removal, addressed by local id
async fn remove_favorite(
    State(state): State<AppState>,
    Path(local_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let session = state.session.require()?;
    let favorites = state.coordinator.favorites(session.user_id).await?;
    let favorite = favorites
        .iter()
        .find(|f| f.local_id == local_id)
        .cloned()
        .ok_or_else(|| Error::NotFound(format!("Favorite {} not found", local_id)))?;

    let outcome = state
        .coordinator
        .remove_favorite(session.user_id, &session.token, &favorite)
        .await?;

    if outcome.notice == ToggleNotice::InFlight {
        return Err(Error::Conflict(
            "Favorite toggle already in progress".to_string(),
        ));
    }

    // Duplicate rows for the same camera keep it a favorite
    let still_favorite = favorites
        .iter()
        .any(|f| f.local_id != local_id && f.camera_id == favorite.camera_id);
    if !still_favorite {
        state
            .map
            .apply_toggle(favorite.camera_id, FavoriteState::NotFavorite)
            .await?;
    }

    Ok(Json(ApiResponse::success(outcome)))
}

// ========================================
// Incident Handlers
// ========================================

/// Incident categories, falling back to the built-in list
async fn incident_types(State(state): State<AppState>) -> impl IntoResponse {
    let credential = state
        .session
        .current()
        .map(|s| s.token)
        .unwrap_or_default();

    let types = match state.remote.fetch_incident_types(&credential).await {
        Ok(types) if !types.is_empty() => types,
        Ok(_) => fallback_incident_types(),
        Err(e) => {
            tracing::warn!(error = %e, "Incident types unavailable, using defaults");
            fallback_incident_types()
        }
    };

    Json(ApiResponse::success(types))
}

fn fallback_incident_types() -> Vec<String> {
    FALLBACK_INCIDENT_TYPES.iter().map(|t| t.to_string()).collect()
}

#[derive(Debug, Deserialize)]
struct CreateIncidentRequest {
    name: String,
    category: String,
    cause: String,
    starts_at: String,
    #[serde(default)]
    ends_at: Option<String>,
    latitude: f64,
    longitude: f64,
}

impl CreateIncidentRequest {
    fn validate(&self) -> Result<()> {
        require_fields(&[
            ("name", &self.name),
            ("category", &self.category),
            ("cause", &self.cause),
            ("starts_at", &self.starts_at),
        ])?;
        if !(-90.0..=90.0).contains(&self.latitude) || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(Error::Validation("coordinates out of range".to_string()));
        }
        Ok(())
    }
}

/// Report a user incident, then refresh the map
async fn create_incident(
    State(state): State<AppState>,
    Json(req): Json<CreateIncidentRequest>,
) -> Result<impl IntoResponse> {
    let session = state.session.require()?;
    req.validate()?;

    let incident = NewIncident {
        user_id: session.user_id,
        name: req.name.trim().to_string(),
        category: req.category,
        cause: req.cause.trim().to_string(),
        starts_at: req.starts_at,
        ends_at: req.ends_at.filter(|e| !e.trim().is_empty()),
        latitude: req.latitude,
        longitude: req.longitude,
    };

    state.remote.create_incident(&session.token, &incident).await?;
    tracing::info!(user_id = session.user_id, name = %incident.name, "Incident reported");

    state.map.refresh().await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(incident))))
}
