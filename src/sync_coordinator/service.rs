//! Sync Coordinator Service
//!
//! Reconciles the local favorites mirror with the remote source of truth at
//! login and on every favorite toggle.
//!
//! ## Fallback policy
//!
//! - Resync failure: mirror untouched, reported as `Offline`, never an error
//! - Toggle-off failure: removed locally anyway (`SavedOffline`)
//! - Toggle-on failure: nothing applied (`Failed`)

use super::gate::ToggleGate;
use super::types::*;
use crate::favorites_cache::{Favorite, FavoritesRepository, NewFavorite};
use crate::models::{Camera, FavoriteState};
use crate::remote_api::RemoteDataService;
use crate::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Sync Coordinator
pub struct SyncCoordinator {
    remote: Arc<dyn RemoteDataService>,
    cache: FavoritesRepository,
    gate: ToggleGate,
}

impl SyncCoordinator {
    pub fn new(remote: Arc<dyn RemoteDataService>, cache: FavoritesRepository) -> Self {
        Self {
            remote,
            cache,
            gate: ToggleGate::new(),
        }
    }

    pub fn remote(&self) -> &Arc<dyn RemoteDataService> {
        &self.remote
    }

    pub fn cache(&self) -> &FavoritesRepository {
        &self.cache
    }

    /// Replace the user's mirror with the remote favorites list.
    ///
    /// Remote failures are absorbed; only local store errors propagate.
    pub async fn resync_on_login(&self, user_id: i64, credential: &str) -> Result<ResyncOutcome> {
        let cameras = match self.remote.fetch_favorite_cameras(credential, user_id).await {
            Ok(Some(cameras)) => cameras,
            Ok(None) => {
                info!(user_id = user_id, "Remote favorites payload is null, keeping local mirror");
                return Ok(ResyncOutcome::Skipped);
            }
            Err(e) => {
                warn!(user_id = user_id, error = %e, "Favorites resync failed, keeping local mirror");
                return Ok(ResyncOutcome::Offline {
                    reason: e.to_string(),
                });
            }
        };

        let favorites: Vec<NewFavorite> = cameras
            .iter()
            .map(|camera| NewFavorite::from_camera(user_id, camera, RESYNC_ADDRESS_PLACEHOLDER))
            .collect();

        let count = self.cache.replace_for_user(user_id, &favorites).await?;
        info!(user_id = user_id, count = count, "Favorites resynced from remote");
        Ok(ResyncOutcome::Replaced { count })
    }

    /// Toggle a camera's favorite flag, remote first.
    ///
    /// `current` is the state the caller is displaying for the camera.
    pub async fn toggle_favorite(
        &self,
        user_id: i64,
        credential: &str,
        camera: &Camera,
        current: FavoriteState,
    ) -> Result<ToggleOutcome> {
        let Some(_lease) = self.gate.try_acquire(user_id, camera.id).await else {
            return Ok(ToggleOutcome {
                camera_id: camera.id,
                state: current,
                notice: ToggleNotice::InFlight,
            });
        };

        let remote_result = self
            .remote
            .toggle_favorite(credential, camera.id, user_id)
            .await;

        let outcome = match (current, remote_result) {
            (FavoriteState::NotFavorite, Ok(())) => {
                let favorite = NewFavorite::from_camera(user_id, camera, TOGGLE_ADDRESS_PLACEHOLDER);
                self.cache.insert(&favorite).await?;
                ToggleOutcome {
                    camera_id: camera.id,
                    state: FavoriteState::Favorite,
                    notice: ToggleNotice::Synced,
                }
            }
            (FavoriteState::NotFavorite, Err(e)) => {
                warn!(user_id = user_id, camera_id = camera.id, error = %e, "Favorite add failed remotely, not applied");
                ToggleOutcome {
                    camera_id: camera.id,
                    state: FavoriteState::NotFavorite,
                    notice: ToggleNotice::Failed {
                        message: e.to_string(),
                    },
                }
            }
            (FavoriteState::Favorite, result) => {
                self.delete_first_match(user_id, camera.id).await?;
                let notice = match result {
                    Ok(()) => ToggleNotice::Synced,
                    Err(e) => {
                        warn!(user_id = user_id, camera_id = camera.id, error = %e, "Favorite removal failed remotely, removed locally");
                        ToggleNotice::SavedOffline
                    }
                };
                ToggleOutcome {
                    camera_id: camera.id,
                    state: FavoriteState::NotFavorite,
                    notice,
                }
            }
        };

        debug!(
            user_id = user_id,
            camera_id = camera.id,
            state = ?outcome.state,
            notice = ?outcome.notice,
            "Favorite toggle resolved"
        );
        Ok(outcome)
    }

    /// Remove a favorite from the favorites list.
    ///
    /// Same fallback as toggle-off, addressed by local id.
    pub async fn remove_favorite(
        &self,
        user_id: i64,
        credential: &str,
        favorite: &Favorite,
    ) -> Result<ToggleOutcome> {
        let Some(_lease) = self.gate.try_acquire(user_id, favorite.camera_id).await else {
            return Ok(ToggleOutcome {
                camera_id: favorite.camera_id,
                state: FavoriteState::Favorite,
                notice: ToggleNotice::InFlight,
            });
        };

        let notice = match self
            .remote
            .toggle_favorite(credential, favorite.camera_id, user_id)
            .await
        {
            Ok(()) => ToggleNotice::Synced,
            Err(e) => {
                warn!(user_id = user_id, local_id = favorite.local_id, error = %e, "Favorite removal failed remotely, removed locally");
                ToggleNotice::SavedOffline
            }
        };

        self.cache.delete_by_local_id(favorite.local_id).await?;
        Ok(ToggleOutcome {
            camera_id: favorite.camera_id,
            state: FavoriteState::NotFavorite,
            notice,
        })
    }

    /// Clear the user's mirror
    pub async fn logout(&self, user_id: i64) -> Result<()> {
        self.cache.clear_by_user(user_id).await?;
        Ok(())
    }

    /// Cached favorites of a user
    pub async fn favorites(&self, user_id: i64) -> Result<Vec<Favorite>> {
        self.cache.list_by_user(user_id).await
    }

    /// Favorite state of a camera according to the local mirror
    pub async fn stored_state(&self, user_id: i64, camera_id: i64) -> Result<FavoriteState> {
        let found = self.cache.find_first(user_id, camera_id).await?;
        Ok(FavoriteState::from_membership(found.is_some()))
    }

    async fn delete_first_match(&self, user_id: i64, camera_id: i64) -> Result<()> {
        match self.cache.find_first(user_id, camera_id).await? {
            Some(favorite) => {
                self.cache.delete_by_local_id(favorite.local_id).await?;
            }
            None => debug!(user_id = user_id, camera_id = camera_id, "No cached favorite to remove"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::favorites_cache::connect;
    use crate::remote_api::fake::{camera, FakeRemote, Reply};
    use std::time::Duration;

    const USER: i64 = 1;
    const TOKEN: &str = "fake-token";

    async fn setup() -> (Arc<FakeRemote>, Arc<SyncCoordinator>) {
        let pool = connect("sqlite::memory:").await.unwrap();
        let cache = FavoritesRepository::new(pool);
        cache.init_schema().await.unwrap();
        let remote = Arc::new(FakeRemote::new());
        let coordinator = Arc::new(SyncCoordinator::new(remote.clone(), cache));
        (remote, coordinator)
    }

    #[tokio::test]
    async fn test_resync_copies_each_camera() {
        let (remote, coordinator) = setup().await;
        remote.set_favorites(Reply::Ok(Some(vec![
            camera(7, "Plaza Mayor"),
            camera(8, "Gran Vía"),
        ])));

        let outcome = coordinator.resync_on_login(USER, TOKEN).await.unwrap();
        assert_eq!(outcome, ResyncOutcome::Replaced { count: 2 });

        let favorites = coordinator.favorites(USER).await.unwrap();
        assert_eq!(favorites.len(), 2);
        let plaza = &favorites[0];
        assert_eq!(plaza.camera_id, 7);
        assert_eq!(plaza.name, "Plaza Mayor");
        assert_eq!(plaza.address, RESYNC_ADDRESS_PLACEHOLDER);
        assert_eq!(plaza.latitude, camera(7, "").latitude);
        assert_eq!(plaza.image.as_deref(), Some("http://img/7.jpg"));
    }

    #[tokio::test]
    async fn test_resync_is_idempotent() {
        let (remote, coordinator) = setup().await;
        remote.set_favorites(Reply::Ok(Some(vec![camera(7, "Plaza Mayor")])));

        coordinator.resync_on_login(USER, TOKEN).await.unwrap();
        coordinator.resync_on_login(USER, TOKEN).await.unwrap();
        assert_eq!(coordinator.favorites(USER).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_resync_empty_list_clears() {
        let (remote, coordinator) = setup().await;
        remote.set_favorites(Reply::Ok(Some(vec![camera(7, "Plaza Mayor")])));
        coordinator.resync_on_login(USER, TOKEN).await.unwrap();

        remote.set_favorites(Reply::Ok(Some(Vec::new())));
        let outcome = coordinator.resync_on_login(USER, TOKEN).await.unwrap();
        assert_eq!(outcome, ResyncOutcome::Replaced { count: 0 });
        assert!(coordinator.favorites(USER).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resync_null_payload_is_noop() {
        let (remote, coordinator) = setup().await;
        remote.set_favorites(Reply::Ok(Some(vec![camera(7, "Plaza Mayor")])));
        coordinator.resync_on_login(USER, TOKEN).await.unwrap();

        remote.set_favorites(Reply::Ok(None));
        let outcome = coordinator.resync_on_login(USER, TOKEN).await.unwrap();
        assert_eq!(outcome, ResyncOutcome::Skipped);
        assert_eq!(coordinator.favorites(USER).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_resync_failure_keeps_mirror() {
        let (remote, coordinator) = setup().await;
        remote.set_favorites(Reply::Ok(Some(vec![camera(7, "Plaza Mayor")])));
        coordinator.resync_on_login(USER, TOKEN).await.unwrap();

        remote.set_favorites(Reply::Offline);
        let outcome = coordinator.resync_on_login(USER, TOKEN).await.unwrap();
        assert!(matches!(outcome, ResyncOutcome::Offline { .. }));

        remote.set_favorites(Reply::Rejected(500));
        let outcome = coordinator.resync_on_login(USER, TOKEN).await.unwrap();
        assert!(matches!(outcome, ResyncOutcome::Offline { .. }));
        assert_eq!(coordinator.favorites(USER).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_toggle_on_then_off_restores_count() {
        let (_remote, coordinator) = setup().await;
        let plaza = camera(7, "Plaza Mayor");

        let on = coordinator
            .toggle_favorite(USER, TOKEN, &plaza, FavoriteState::NotFavorite)
            .await
            .unwrap();
        assert_eq!(on.state, FavoriteState::Favorite);
        assert_eq!(on.notice, ToggleNotice::Synced);
        let favorites = coordinator.favorites(USER).await.unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].address, TOGGLE_ADDRESS_PLACEHOLDER);

        let off = coordinator
            .toggle_favorite(USER, TOKEN, &plaza, FavoriteState::Favorite)
            .await
            .unwrap();
        assert_eq!(off.state, FavoriteState::NotFavorite);
        assert!(coordinator.favorites(USER).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_off_removes_first_match_only() {
        let (_remote, coordinator) = setup().await;
        let plaza = camera(7, "Plaza Mayor");
        let cache = coordinator.cache();
        let first = cache
            .insert(&NewFavorite::from_camera(USER, &plaza, RESYNC_ADDRESS_PLACEHOLDER))
            .await
            .unwrap();
        cache
            .insert(&NewFavorite::from_camera(USER, &plaza, RESYNC_ADDRESS_PLACEHOLDER))
            .await
            .unwrap();

        coordinator
            .toggle_favorite(USER, TOKEN, &plaza, FavoriteState::Favorite)
            .await
            .unwrap();
        let remaining = coordinator.favorites(USER).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_ne!(remaining[0].local_id, first);
    }

    #[tokio::test]
    async fn test_toggle_off_without_cached_row_is_silent() {
        let (_remote, coordinator) = setup().await;
        let outcome = coordinator
            .toggle_favorite(USER, TOKEN, &camera(9, "Atocha"), FavoriteState::Favorite)
            .await
            .unwrap();
        assert_eq!(outcome.state, FavoriteState::NotFavorite);
        assert_eq!(outcome.notice, ToggleNotice::Synced);
    }

    // Removal is applied locally even when the remote fails; addition is not.
    #[tokio::test]
    async fn test_toggle_failure_asymmetry() {
        let (remote, coordinator) = setup().await;
        let plaza = camera(7, "Plaza Mayor");
        let gran_via = camera(8, "Gran Vía");
        coordinator
            .toggle_favorite(USER, TOKEN, &plaza, FavoriteState::NotFavorite)
            .await
            .unwrap();

        remote.set_toggle(Reply::Offline);

        let add = coordinator
            .toggle_favorite(USER, TOKEN, &gran_via, FavoriteState::NotFavorite)
            .await
            .unwrap();
        assert_eq!(add.state, FavoriteState::NotFavorite);
        assert!(matches!(add.notice, ToggleNotice::Failed { .. }));
        let favorites = coordinator.favorites(USER).await.unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].camera_id, 7);

        let remove = coordinator
            .toggle_favorite(USER, TOKEN, &plaza, FavoriteState::Favorite)
            .await
            .unwrap();
        assert_eq!(remove.state, FavoriteState::NotFavorite);
        assert_eq!(remove.notice, ToggleNotice::SavedOffline);
        assert!(coordinator.favorites(USER).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_toggle_rejected() {
        let (remote, coordinator) = setup().await;
        *remote.toggle_delay.lock().unwrap() = Some(Duration::from_millis(200));
        let plaza = camera(7, "Plaza Mayor");

        let first = {
            let coordinator = coordinator.clone();
            let plaza = plaza.clone();
            tokio::spawn(async move {
                coordinator
                    .toggle_favorite(USER, TOKEN, &plaza, FavoriteState::NotFavorite)
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        let second = coordinator
            .toggle_favorite(USER, TOKEN, &plaza, FavoriteState::NotFavorite)
            .await
            .unwrap();
        assert_eq!(second.notice, ToggleNotice::InFlight);
        assert_eq!(second.state, FavoriteState::NotFavorite);

        let first = first.await.unwrap().unwrap();
        assert_eq!(first.state, FavoriteState::Favorite);
        assert_eq!(remote.toggle_calls(), 1);
        assert_eq!(coordinator.favorites(USER).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_favorite_offline() {
        let (remote, coordinator) = setup().await;
        remote.set_favorites(Reply::Ok(Some(vec![camera(7, "Plaza Mayor")])));
        coordinator.resync_on_login(USER, TOKEN).await.unwrap();
        let favorite = coordinator.favorites(USER).await.unwrap().remove(0);

        remote.set_toggle(Reply::Rejected(503));
        let outcome = coordinator
            .remove_favorite(USER, TOKEN, &favorite)
            .await
            .unwrap();
        assert_eq!(outcome.notice, ToggleNotice::SavedOffline);
        assert_eq!(outcome.camera_id, 7);
        assert!(coordinator.favorites(USER).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_logout_clears_mirror() {
        let (remote, coordinator) = setup().await;
        remote.set_favorites(Reply::Ok(Some(vec![camera(7, "Plaza Mayor")])));
        coordinator.resync_on_login(USER, TOKEN).await.unwrap();

        coordinator.logout(USER).await.unwrap();
        assert!(coordinator.favorites(USER).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stored_state_reads_mirror() {
        let (remote, coordinator) = setup().await;
        remote.set_favorites(Reply::Ok(Some(vec![camera(7, "Plaza Mayor")])));
        coordinator.resync_on_login(USER, TOKEN).await.unwrap();

        assert_eq!(
            coordinator.stored_state(USER, 7).await.unwrap(),
            FavoriteState::Favorite
        );
        assert_eq!(
            coordinator.stored_state(USER, 8).await.unwrap(),
            FavoriteState::NotFavorite
        );
        assert_eq!(
            coordinator.stored_state(2, 7).await.unwrap(),
            FavoriteState::NotFavorite
        );
    }
}
