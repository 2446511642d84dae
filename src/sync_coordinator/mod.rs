//! Sync Coordinator
//!
//! Keeps the local favorites mirror consistent with the InfoCam API across
//! login, toggle and connectivity loss.
//!
//! ## Module layout
//! - `types`: outcomes, notices and placeholder addresses
//! - `gate`: per-(user, camera) toggle gate
//! - `service`: `SyncCoordinator`
//!
//! The remote is the source of truth. The coordinator is the only bulk
//! writer of the favorites cache.

pub mod gate;
pub mod service;
pub mod types;

pub use gate::{ToggleGate, ToggleLease};
pub use service::SyncCoordinator;
pub use types::*;
