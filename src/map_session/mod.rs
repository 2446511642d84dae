//! Map Session
//!
//! The render-owning context of the map. A tokio task owns the filter, the
//! live favorite set and the overlay; the rendering shell talks to it through
//! a cloneable `MapSessionHandle`.
//!
//! ## Refresh cycle
//!
//! 1. Favorites are resolved (remote resync, or the local mirror offline)
//! 2. Cameras and incidents are fetched concurrently on the request pool
//! 3. Each layer renders as soon as its own result arrives
//!
//! Results from an older cycle are dropped. A failed fetch keeps the
//! previously rendered layer.

mod session;
pub mod types;

pub use types::{MapCommand, OverlaySnapshot};

use crate::error::{Error, Result};
use crate::models::FavoriteState;
use crate::overlay::FilterConfiguration;
use crate::request_pool::RequestPool;
use crate::session::Session;
use crate::sync_coordinator::{SyncCoordinator, ToggleOutcome};
use session::MapSession;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

const COMMAND_BUFFER: usize = 64;

/// Handle to a running map session
#[derive(Clone)]
pub struct MapSessionHandle {
    tx: mpsc::Sender<MapCommand>,
}

impl MapSessionHandle {
    /// Spawn the session task.
    ///
    /// The task stops once every handle is dropped.
    pub fn spawn(
        coordinator: Arc<SyncCoordinator>,
        pool: RequestPool,
        session_rx: watch::Receiver<Option<Session>>,
        filter: FilterConfiguration,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let session = MapSession::new(coordinator, pool, rx, session_rx, filter);
        let task = tokio::spawn(session.run());
        (Self { tx }, task)
    }

    async fn send(&self, command: MapCommand) -> Result<()> {
        self.tx
            .send(command)
            .await
            .map_err(|_| Error::Internal("map session stopped".to_string()))
    }

    /// Start a refresh cycle
    pub async fn refresh(&self) -> Result<()> {
        self.send(MapCommand::Refresh).await
    }

    pub async fn set_filter(&self, filter: FilterConfiguration) -> Result<()> {
        self.send(MapCommand::SetFilter(filter)).await
    }

    /// Current markers
    pub async fn overlay(&self) -> Result<OverlaySnapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(MapCommand::Overlay(reply)).await?;
        rx.await
            .map_err(|_| Error::Internal("map session stopped".to_string()))
    }

    /// Toggle a camera currently on the map, resolving once the remote answers
    pub async fn toggle_favorite(&self, camera_id: i64) -> Result<ToggleOutcome> {
        let (reply, rx) = oneshot::channel();
        self.send(MapCommand::ToggleFavorite { camera_id, reply })
            .await?;
        rx.await
            .map_err(|_| Error::Internal("map session stopped".to_string()))?
    }

    /// Reflect a favorite change made outside the map
    pub async fn apply_toggle(&self, camera_id: i64, state: FavoriteState) -> Result<()> {
        self.send(MapCommand::ApplyToggle { camera_id, state }).await
    }
}
