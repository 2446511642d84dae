//! Overlay type definitions

use crate::favorites_cache::Favorite;
use crate::models::FavoriteState;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Which entity kinds are visible on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfiguration {
    pub show_cameras: bool,
    pub show_official: bool,
    pub show_user_reported: bool,
    /// Restricts cameras to favorites and hides every incident
    pub show_favorites_only: bool,
}

impl Default for FilterConfiguration {
    fn default() -> Self {
        Self {
            show_cameras: true,
            show_official: true,
            show_user_reported: true,
            show_favorites_only: false,
        }
    }
}

/// Stable reference from a marker back to its entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum MarkerRef {
    Camera(i64),
    Incident(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerIcon {
    Camera,
    CameraFavorite,
    IncidentOfficial,
    IncidentUser,
}

/// Per-kind render payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MarkerDetail {
    Camera {
        favorite: FavoriteState,
        image: Option<String>,
    },
    Incident {
        official: bool,
        category: Option<String>,
        cause: Option<String>,
        period: Option<String>,
    },
}

/// Render-ready map marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub marker_ref: MarkerRef,
    pub title: String,
    pub latitude: f64,
    pub longitude: f64,
    pub icon: MarkerIcon,
    pub detail: MarkerDetail,
}

impl Marker {
    /// Favorite state for camera markers, `None` for incidents
    pub fn favorite_state(&self) -> Option<FavoriteState> {
        match self.detail {
            MarkerDetail::Camera { favorite, .. } => Some(favorite),
            MarkerDetail::Incident { .. } => None,
        }
    }

    /// Update a camera marker in place. Returns false for incident markers.
    pub fn set_favorite_state(&mut self, state: FavoriteState) -> bool {
        match &mut self.detail {
            MarkerDetail::Camera { favorite, .. } => {
                *favorite = state;
                self.icon = camera_icon(state);
                true
            }
            MarkerDetail::Incident { .. } => false,
        }
    }
}

pub(crate) fn camera_icon(state: FavoriteState) -> MarkerIcon {
    match state {
        FavoriteState::Favorite => MarkerIcon::CameraFavorite,
        FavoriteState::NotFavorite => MarkerIcon::Camera,
    }
}

/// Favorite camera ids of the current user, computed once per cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoriteSet(HashSet<i64>);

impl FavoriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_favorites(favorites: &[Favorite]) -> Self {
        Self(favorites.iter().map(|f| f.camera_id).collect())
    }

    pub fn contains(&self, camera_id: i64) -> bool {
        self.0.contains(&camera_id)
    }

    pub fn state_of(&self, camera_id: i64) -> FavoriteState {
        FavoriteState::from_membership(self.contains(camera_id))
    }

    pub fn insert(&mut self, camera_id: i64) -> bool {
        self.0.insert(camera_id)
    }

    pub fn remove(&mut self, camera_id: i64) -> bool {
        self.0.remove(&camera_id)
    }

    /// Apply a resolved toggle
    pub fn apply(&mut self, camera_id: i64, state: FavoriteState) {
        match state {
            FavoriteState::Favorite => self.insert(camera_id),
            FavoriteState::NotFavorite => self.remove(camera_id),
        };
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
