//! Map session task
//!
//! Single owner of the filter, the live favorite set, the last fetched
//! snapshots and the overlay. Remote work runs on the request pool and comes
//! back as `SessionEvent`s, so render state is only ever mutated here.

use super::types::*;
use crate::models::{Camera, FavoriteState, Incident};
use crate::overlay::{FavoriteSet, FilterConfiguration, MarkerRef, OverlayPipeline};
use crate::request_pool::RequestPool;
use crate::session::Session;
use crate::sync_coordinator::{SyncCoordinator, ToggleNotice, ToggleOutcome};
use crate::{Error, Result};
use chrono::Local;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

pub(crate) struct MapSession {
    coordinator: Arc<SyncCoordinator>,
    pool: RequestPool,
    commands: mpsc::Receiver<MapCommand>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
    session_rx: watch::Receiver<Option<Session>>,
    watch_session: bool,

    filter: FilterConfiguration,
    favorites: FavoriteSet,
    /// User whose favorites `favorites` holds; `None` until loaded
    favorites_owner: Option<i64>,
    cameras: Vec<Camera>,
    incidents: Vec<Incident>,
    pipeline: OverlayPipeline,
    cycle: u64,
    pending: usize,
}

impl MapSession {
    pub(crate) fn new(
        coordinator: Arc<SyncCoordinator>,
        pool: RequestPool,
        commands: mpsc::Receiver<MapCommand>,
        session_rx: watch::Receiver<Option<Session>>,
        filter: FilterConfiguration,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            coordinator,
            pool,
            commands,
            events_tx,
            events_rx,
            session_rx,
            watch_session: true,
            filter,
            favorites: FavoriteSet::new(),
            favorites_owner: None,
            cameras: Vec::new(),
            incidents: Vec::new(),
            pipeline: OverlayPipeline::new(),
            cycle: 0,
            pending: 0,
        }
    }

    pub(crate) async fn run(mut self) {
        info!("Map session started");
        // Mark the initial session value as seen
        self.session_rx.borrow_and_update();

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(event) = self.events_rx.recv() => self.handle_event(event),
                changed = self.session_rx.changed(), if self.watch_session => match changed {
                    Ok(()) => self.on_session_change(),
                    Err(_) => self.watch_session = false,
                },
            }
        }

        info!(cycle = self.cycle, "Map session stopped");
    }

    fn current_session(&self) -> Option<Session> {
        self.session_rx.borrow().clone()
    }

    fn handle_command(&mut self, command: MapCommand) {
        match command {
            MapCommand::Refresh => self.start_cycle(true),
            MapCommand::SetFilter(filter) => {
                debug!(filter = ?filter, "Filter changed");
                self.filter = filter;
                self.rebuild();
                self.start_cycle(false);
            }
            MapCommand::Overlay(reply) => {
                let _ = reply.send(self.snapshot());
            }
            MapCommand::ToggleFavorite { camera_id, reply } => self.start_toggle(camera_id, reply),
            MapCommand::ApplyToggle { camera_id, state } => self.apply_toggle(camera_id, state),
        }
    }

    fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::FavoritesLoaded {
                cycle,
                user_id,
                favorites,
            } => {
                if !self.is_current(cycle, "favorites") {
                    return;
                }
                self.pending = self.pending.saturating_sub(1);
                if let Some(favorites) = favorites {
                    self.favorites = favorites;
                    self.favorites_owner = Some(user_id);
                }
                self.fetch_layers(cycle);
            }
            SessionEvent::CamerasLoaded { cycle, result } => {
                if !self.is_current(cycle, "cameras") {
                    return;
                }
                self.pending = self.pending.saturating_sub(1);
                match result {
                    Ok(cameras) => {
                        debug!(cycle = cycle, count = cameras.len(), "Camera layer loaded");
                        self.cameras = cameras;
                        self.pipeline
                            .set_cameras(&self.cameras, &self.favorites, &self.filter);
                    }
                    Err(e) => warn!(cycle = cycle, error = %e, "Camera fetch failed, keeping previous layer"),
                }
            }
            SessionEvent::IncidentsLoaded { cycle, result } => {
                if !self.is_current(cycle, "incidents") {
                    return;
                }
                self.pending = self.pending.saturating_sub(1);
                match result {
                    Ok(incidents) => {
                        debug!(cycle = cycle, count = incidents.len(), "Incident layer loaded");
                        self.incidents = incidents;
                        self.pipeline.set_incidents(&self.incidents, &self.filter);
                    }
                    Err(e) => warn!(cycle = cycle, error = %e, "Incident fetch failed, keeping previous layer"),
                }
            }
            SessionEvent::ToggleCompleted {
                user_id,
                outcome,
                reply,
            } => {
                if let Ok(ref outcome) = outcome {
                    let same_user = self
                        .current_session()
                        .map_or(false, |s| s.user_id == user_id);
                    if same_user && outcome.notice != ToggleNotice::InFlight {
                        self.apply_toggle(outcome.camera_id, outcome.state);
                    }
                }
                let _ = reply.send(outcome);
            }
        }
    }

    fn on_session_change(&mut self) {
        match self.current_session() {
            Some(session) => debug!(user_id = session.user_id, "Session began, refreshing map"),
            None => debug!("Session ended, clearing favorites"),
        }
        // The previous user's stars must not outlive their session
        self.favorites.clear();
        self.favorites_owner = None;
        self.rebuild();
        self.start_cycle(false);
    }

    fn is_current(&self, cycle: u64, layer: &str) -> bool {
        if cycle != self.cycle {
            debug!(cycle = cycle, current = self.cycle, layer = layer, "Dropping stale result");
            return false;
        }
        true
    }

    /// Rebuild both layers from the last snapshots under the current filter
    fn rebuild(&mut self) {
        self.pipeline
            .set_cameras(&self.cameras, &self.favorites, &self.filter);
        self.pipeline.set_incidents(&self.incidents, &self.filter);
    }

    /// Begin a refresh cycle.
    ///
    /// With a session, favorites are resolved first (`resync` re-pulls them
    /// from the remote, otherwise the local mirror is used) and the layers
    /// are fetched once they arrive.
    fn start_cycle(&mut self, resync: bool) {
        self.cycle += 1;
        self.pending = 0;
        let cycle = self.cycle;

        let Some(session) = self.current_session() else {
            self.favorites.clear();
            self.favorites_owner = None;
            self.fetch_layers(cycle);
            return;
        };

        self.pending += 1;
        let coordinator = self.coordinator.clone();
        let tx = self.events_tx.clone();
        self.pool.spawn(async move {
            let favorites = resolve_favorites(&coordinator, &session, resync).await;
            let event = SessionEvent::FavoritesLoaded {
                cycle,
                user_id: session.user_id,
                favorites,
            };
            if tx.send(event).is_err() {
                debug!(cycle = cycle, "Map session gone, dropping favorites");
            }
        });
    }

    fn fetch_layers(&mut self, cycle: u64) {
        let session = self.current_session();
        let credential = session.as_ref().map(|s| s.token.clone()).unwrap_or_default();
        let user_id = session.as_ref().map(|s| s.user_id);

        if self.filter.show_cameras {
            self.pending += 1;
            let remote = self.coordinator.remote().clone();
            let tx = self.events_tx.clone();
            let credential = credential.clone();
            self.pool.spawn(async move {
                let result = remote.fetch_active_cameras(&credential).await;
                if tx.send(SessionEvent::CamerasLoaded { cycle, result }).is_err() {
                    debug!(cycle = cycle, "Map session gone, dropping cameras");
                }
            });
        } else {
            self.pipeline.clear_cameras();
        }

        if !self.filter.show_favorites_only {
            self.pending += 1;
            let remote = self.coordinator.remote().clone();
            let tx = self.events_tx.clone();
            self.pool.spawn(async move {
                let as_of = Local::now().naive_local();
                let result = remote
                    .fetch_active_incidents(&credential, as_of, user_id)
                    .await;
                if tx.send(SessionEvent::IncidentsLoaded { cycle, result }).is_err() {
                    debug!(cycle = cycle, "Map session gone, dropping incidents");
                }
            });
        } else {
            self.pipeline.clear_incidents();
        }
    }

    fn start_toggle(
        &mut self,
        camera_id: i64,
        reply: oneshot::Sender<Result<ToggleOutcome>>,
    ) {
        let Some(session) = self.current_session() else {
            let _ = reply.send(Err(Error::Unauthorized("No active session".to_string())));
            return;
        };
        let Some(camera) = self.cameras.iter().find(|c| c.id == camera_id).cloned() else {
            let _ = reply.send(Err(Error::NotFound(format!("Camera {} is not on the map", camera_id))));
            return;
        };

        // Until this user's favorites have loaded the live set is empty,
        // so the mirror decides whether this is an add or a removal
        let known = (self.favorites_owner == Some(session.user_id))
            .then(|| self.favorites.state_of(camera_id));
        let coordinator = self.coordinator.clone();
        let tx = self.events_tx.clone();
        self.pool.spawn(async move {
            let current = match known {
                Some(state) => Ok(state),
                None => coordinator.stored_state(session.user_id, camera_id).await,
            };
            let outcome = match current {
                Ok(current) => {
                    coordinator
                        .toggle_favorite(session.user_id, &session.token, &camera, current)
                        .await
                }
                Err(e) => Err(e),
            };
            let event = SessionEvent::ToggleCompleted {
                user_id: session.user_id,
                outcome,
                reply,
            };
            if tx.send(event).is_err() {
                debug!(camera_id = camera_id, "Map session gone, dropping toggle result");
            }
        });
    }

    fn apply_toggle(&mut self, camera_id: i64, state: FavoriteState) {
        self.favorites.apply(camera_id, state);
        self.pipeline
            .apply_toggle_result(MarkerRef::Camera(camera_id), state);
    }

    fn snapshot(&self) -> OverlaySnapshot {
        OverlaySnapshot {
            cycle: self.cycle,
            loading: self.pending > 0,
            filter: self.filter,
            favorite_count: self.favorites.len(),
            markers: self.pipeline.markers(),
        }
    }
}

/// Favorite set for a cycle, read from the mirror after an optional resync.
/// `None` keeps the previous set.
async fn resolve_favorites(
    coordinator: &SyncCoordinator,
    session: &Session,
    resync: bool,
) -> Option<FavoriteSet> {
    if resync {
        match coordinator
            .resync_on_login(session.user_id, &session.token)
            .await
        {
            Ok(outcome) => debug!(user_id = session.user_id, outcome = ?outcome, "Favorites resolved"),
            Err(e) => warn!(user_id = session.user_id, error = %e, "Favorites resync failed"),
        }
    }

    // After a replace the mirror equals the remote list; skipped or offline
    // it is the last known state.
    match coordinator.favorites(session.user_id).await {
        Ok(favorites) => Some(FavoriteSet::from_favorites(&favorites)),
        Err(e) => {
            warn!(user_id = session.user_id, error = %e, "Reading favorites mirror failed");
            None
        }
    }
}
