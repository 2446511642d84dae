//! Application state
//!
//! Holds all shared components and state

use crate::map_session::MapSessionHandle;
use crate::remote_api::RemoteDataService;
use crate::request_pool::{RequestPool, DEFAULT_MAX_IN_FLIGHT};
use crate::session::SessionStore;
use crate::sync_coordinator::SyncCoordinator;
use std::path::PathBuf;
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// InfoCam API root
    pub api_url: String,
    /// Favorites store URL (SQLite)
    pub database_url: String,
    /// Server port
    pub port: u16,
    /// Server host
    pub host: String,
    /// Upper bound of concurrent remote requests
    pub max_in_flight_requests: usize,
    /// Map front-end bundle, served at `/` when set
    pub static_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: std::env::var("INFOCAM_API_URL")
                .unwrap_or_else(|_| "http://10.10.16.85:8080/api/".to_string()),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://infocam.db?mode=rwc".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            host: std::env::var("HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            max_in_flight_requests: std::env::var("MAX_IN_FLIGHT_REQUESTS")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(DEFAULT_MAX_IN_FLIGHT),
            static_dir: std::env::var("STATIC_DIR").ok().map(PathBuf::from),
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Signed-in user
    pub session: Arc<SessionStore>,
    /// InfoCam API
    pub remote: Arc<dyn RemoteDataService>,
    /// Favorites reconciliation
    pub coordinator: Arc<SyncCoordinator>,
    /// Map overlay owner
    pub map: MapSessionHandle,
    /// Remote request budget shared with the map session
    pub requests: RequestPool,
}
