//! Overlay pipeline
//!
//! Turns cameras, incidents and the favorite set into the marker set under a
//! filter configuration. Each rebuild replaces the previous markers wholesale.

use super::types::*;
use crate::models::{Camera, FavoriteState, Incident};

/// Camera layer
pub fn camera_markers(
    cameras: &[Camera],
    favorites: &FavoriteSet,
    filter: &FilterConfiguration,
) -> Vec<Marker> {
    if !filter.show_cameras {
        return Vec::new();
    }

    cameras
        .iter()
        .filter_map(|camera| {
            let state = favorites.state_of(camera.id);
            if filter.show_favorites_only && !state.is_favorite() {
                return None;
            }
            Some(Marker {
                marker_ref: MarkerRef::Camera(camera.id),
                title: camera.name.clone(),
                latitude: camera.latitude,
                longitude: camera.longitude,
                icon: camera_icon(state),
                detail: MarkerDetail::Camera {
                    favorite: state,
                    image: camera.image.clone(),
                },
            })
        })
        .collect()
}

/// Incident layer
pub fn incident_markers(incidents: &[Incident], filter: &FilterConfiguration) -> Vec<Marker> {
    // Incidents have no favorite concept
    if filter.show_favorites_only {
        return Vec::new();
    }

    incidents
        .iter()
        .filter(|incident| {
            if incident.is_official() {
                filter.show_official
            } else {
                filter.show_user_reported
            }
        })
        .map(|incident| {
            let official = incident.is_official();
            Marker {
                marker_ref: MarkerRef::Incident(incident.id),
                title: incident
                    .name
                    .clone()
                    .filter(|n| !n.is_empty())
                    .or_else(|| incident.category.clone())
                    .unwrap_or_else(|| format!("Incidencia {}", incident.id)),
                latitude: incident.latitude,
                longitude: incident.longitude,
                icon: if official {
                    MarkerIcon::IncidentOfficial
                } else {
                    MarkerIcon::IncidentUser
                },
                detail: MarkerDetail::Incident {
                    official,
                    category: incident.category.clone(),
                    cause: incident.cause.clone(),
                    period: incident.display_period(),
                },
            }
        })
        .collect()
}

/// Full overlay: camera markers followed by incident markers
pub fn build_overlay(
    cameras: &[Camera],
    incidents: &[Incident],
    favorites: &FavoriteSet,
    filter: &FilterConfiguration,
) -> Vec<Marker> {
    let mut markers = camera_markers(cameras, favorites, filter);
    markers.extend(incident_markers(incidents, filter));
    markers
}

/// Current overlay, kept as two independently resolved layers
#[derive(Debug, Clone, Default)]
pub struct OverlayPipeline {
    cameras: Vec<Marker>,
    incidents: Vec<Marker>,
}

impl OverlayPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the camera layer
    pub fn set_cameras(
        &mut self,
        cameras: &[Camera],
        favorites: &FavoriteSet,
        filter: &FilterConfiguration,
    ) {
        self.cameras = camera_markers(cameras, favorites, filter);
    }

    /// Replace the incident layer
    pub fn set_incidents(&mut self, incidents: &[Incident], filter: &FilterConfiguration) {
        self.incidents = incident_markers(incidents, filter);
    }

    pub fn clear_cameras(&mut self) {
        self.cameras.clear();
    }

    pub fn clear_incidents(&mut self) {
        self.incidents.clear();
    }

    pub fn clear(&mut self) {
        self.cameras.clear();
        self.incidents.clear();
    }

    pub fn markers(&self) -> Vec<Marker> {
        self.cameras
            .iter()
            .chain(self.incidents.iter())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.cameras.len() + self.incidents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Update one camera marker after a toggle, without a rebuild.
    ///
    /// Returns false when no such camera marker is rendered.
    pub fn apply_toggle_result(&mut self, marker_ref: MarkerRef, state: FavoriteState) -> bool {
        if !matches!(marker_ref, MarkerRef::Camera(_)) {
            return false;
        }
        self.cameras
            .iter_mut()
            .find(|m| m.marker_ref == marker_ref)
            .map(|m| m.set_favorite_state(state))
            .unwrap_or(false)
    }
}
