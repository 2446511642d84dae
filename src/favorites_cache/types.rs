//! Favorites cache type definitions

use crate::models::Camera;
use serde::{Deserialize, Serialize};

/// Locally persisted favorite camera.
///
/// `local_id` is assigned by the store on insert and is only meaningful
/// locally. The same `(user_id, camera_id)` pair may appear more than once;
/// removal targets the first match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub local_id: i64,
    pub user_id: i64,
    pub camera_id: i64,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub image: Option<String>,
}

/// Favorite about to be inserted (no local id yet)
#[derive(Debug, Clone, PartialEq)]
pub struct NewFavorite {
    pub user_id: i64,
    pub camera_id: i64,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub image: Option<String>,
}

impl NewFavorite {
    /// Build a cache entry from a camera snapshot, with a placeholder address
    pub fn from_camera(user_id: i64, camera: &Camera, address: &str) -> Self {
        Self {
            user_id,
            camera_id: camera.id,
            name: camera.name.clone(),
            address: address.to_string(),
            latitude: camera.latitude,
            longitude: camera.longitude,
            image: camera.image.clone(),
        }
    }
}

/// DB row
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct FavoriteRow {
    pub local_id: i64,
    pub user_id: i64,
    pub camera_id: i64,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub image: Option<String>,
}

impl From<FavoriteRow> for Favorite {
    fn from(row: FavoriteRow) -> Self {
        Self {
            local_id: row.local_id,
            user_id: row.user_id,
            camera_id: row.camera_id,
            name: row.name,
            address: row.address,
            latitude: row.latitude,
            longitude: row.longitude,
            image: row.image,
        }
    }
}
