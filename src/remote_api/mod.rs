//! Remote Data Service
//!
//! Access to the InfoCam REST API: cameras, per-user favorites, incidents,
//! incident categories and user accounts.
//!
//! ## Module layout
//! - `types`: wire payloads
//! - `client`: reqwest implementation (`InfocamClient`)
//!
//! Every call returns `Result`. Connectivity loss surfaces as
//! `Error::Transport`; a non-success status as `Error::RemoteRejection`.

pub mod client;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use client::InfocamClient;
pub use types::*;

use crate::models::{Camera, Incident};
use crate::session::Session;
use crate::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;

/// Remote source of truth for cameras, favorites and incidents
#[async_trait]
pub trait RemoteDataService: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> Result<Session>;

    /// Create a regular (non-admin) account
    async fn register(&self, user: &types::NewUser) -> Result<()>;

    /// Update the signed-in user's profile and return the stored record
    async fn update_profile(
        &self,
        credential: &str,
        user_id: i64,
        update: &types::ProfileUpdate,
    ) -> Result<types::UserProfile>;

    /// Favorite cameras of a user. `None` when the API answers with a null
    /// payload, which is distinct from an empty list.
    async fn fetch_favorite_cameras(
        &self,
        credential: &str,
        user_id: i64,
    ) -> Result<Option<Vec<Camera>>>;

    async fn fetch_active_cameras(&self, credential: &str) -> Result<Vec<Camera>>;

    /// Incidents active at `as_of` (local wall time, minute precision)
    async fn fetch_active_incidents(
        &self,
        credential: &str,
        as_of: NaiveDateTime,
        user_id: Option<i64>,
    ) -> Result<Vec<Incident>>;

    /// Flip the remote favorite flag for a camera
    async fn toggle_favorite(&self, credential: &str, camera_id: i64, user_id: i64) -> Result<()>;

    async fn fetch_incident_types(&self, credential: &str) -> Result<Vec<String>>;

    async fn create_incident(&self, credential: &str, incident: &types::NewIncident) -> Result<()>;
}
