//! Map session messages and snapshots

use crate::models::{Camera, FavoriteState, Incident};
use crate::overlay::{FavoriteSet, FilterConfiguration, Marker};
use crate::sync_coordinator::ToggleOutcome;
use crate::Result;
use serde::Serialize;
use tokio::sync::oneshot;

/// Commands from the rendering shell
#[derive(Debug)]
pub enum MapCommand {
    /// Start a new refresh cycle (resync favorites, then fetch both layers)
    Refresh,
    /// Replace the filter, rebuild from the last snapshots, then refresh
    SetFilter(FilterConfiguration),
    Overlay(oneshot::Sender<OverlaySnapshot>),
    /// Toggle a rendered camera. The current state comes from the live
    /// favorite set, or from the local mirror until that set has loaded.
    ToggleFavorite {
        camera_id: i64,
        reply: oneshot::Sender<Result<ToggleOutcome>>,
    },
    /// A favorite changed outside the map (favorites list removal)
    ApplyToggle { camera_id: i64, state: FavoriteState },
}

/// Worker results delivered back to the session task
#[derive(Debug)]
pub(crate) enum SessionEvent {
    /// `None` keeps the previous favorite set
    FavoritesLoaded {
        cycle: u64,
        user_id: i64,
        favorites: Option<FavoriteSet>,
    },
    CamerasLoaded {
        cycle: u64,
        result: Result<Vec<Camera>>,
    },
    IncidentsLoaded {
        cycle: u64,
        result: Result<Vec<Incident>>,
    },
    ToggleCompleted {
        user_id: i64,
        outcome: Result<ToggleOutcome>,
        reply: oneshot::Sender<Result<ToggleOutcome>>,
    },
}

/// Render-ready view of the map
#[derive(Debug, Clone, Serialize)]
pub struct OverlaySnapshot {
    pub cycle: u64,
    /// True while fetches of the current cycle are outstanding
    pub loading: bool,
    pub filter: FilterConfiguration,
    pub favorite_count: usize,
    pub markers: Vec<Marker>,
}
