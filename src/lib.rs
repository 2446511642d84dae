//! InfoCam Sync Library
//!
//! Offline-first favorites reconciliation and map overlay pipeline for
//! traffic cameras and incidents.
//!
//! ## Architecture (8 Components)
//!
//! 1. RemoteDataService - InfoCam REST API access
//! 2. FavoritesCache - Local per-user favorites mirror (SQLite)
//! 3. SessionStore - Signed-in user and credential
//! 4. SyncCoordinator - Cache/remote reconciliation and fallback policy
//! 5. OverlayPipeline - Cameras + incidents + favorites -> markers
//! 6. RequestPool - Bounded concurrency for remote calls
//! 7. MapSession - Render-owning task for the overlay
//! 8. WebAPI - REST endpoints for the map shell
//!
//! ## Design Principles
//!
//! - The remote is the source of truth; the cache is a mirror
//! - Only the map session task mutates the overlay

pub mod error;
pub mod favorites_cache;
pub mod map_session;
pub mod models;
pub mod overlay;
pub mod remote_api;
pub mod request_pool;
pub mod session;
pub mod state;
pub mod sync_coordinator;
pub mod web_api;

pub use error::{Error, Result};
pub use state::AppState;
