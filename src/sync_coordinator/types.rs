//! Sync coordinator type definitions

use crate::models::FavoriteState;
use serde::{Deserialize, Serialize};

/// Address stored for favorites copied from the remote list at login
pub const RESYNC_ADDRESS_PLACEHOLDER: &str = "Vía pública";

/// Address stored for favorites added from the map
pub const TOGGLE_ADDRESS_PLACEHOLDER: &str = "Cámara de tráfico";

/// Result of a login/resume resync
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResyncOutcome {
    /// Local mirror replaced by the remote list (possibly empty)
    Replaced { count: usize },
    /// Remote answered with a null payload; mirror untouched
    Skipped,
    /// Remote unreachable or failing; mirror untouched
    Offline { reason: String },
}

/// User-facing notice attached to a toggle result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "notice", rename_all = "snake_case")]
pub enum ToggleNotice {
    /// Remote and local agree
    Synced,
    /// Remote failed on removal; removed locally anyway
    SavedOffline,
    /// Remote failed on addition; nothing changed
    Failed { message: String },
    /// Another toggle for the same camera has not resolved yet
    InFlight,
}

/// Result of a favorite toggle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleOutcome {
    pub camera_id: i64,
    /// State after the toggle resolved
    pub state: FavoriteState,
    #[serde(flatten)]
    pub notice: ToggleNotice,
}
