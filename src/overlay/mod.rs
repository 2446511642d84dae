//! Overlay Pipeline
//!
//! Merges cameras, incidents and the live favorite set into render-ready map
//! markers under a user-controlled filter configuration.
//!
//! ## Module layout
//! - `types`: filter, marker and favorite-set types
//! - `pipeline`: layer builders and `OverlayPipeline`

pub mod pipeline;
pub mod types;

pub use pipeline::{build_overlay, camera_markers, incident_markers, OverlayPipeline};
pub use types::*;
