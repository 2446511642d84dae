//! ToggleGate - one in-flight toggle per (user, camera)
//!
//! A toggle issued while another one for the same camera is unresolved is
//! refused immediately instead of queued.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

type GateKey = (i64, i64);

pub struct ToggleGate {
    locks: RwLock<HashMap<GateKey, Arc<Mutex<()>>>>,
}

impl ToggleGate {
    pub fn new() -> Self {
        Self {
            locks: RwLock::new(HashMap::new()),
        }
    }

    /// Try to claim the camera for this user (no wait).
    ///
    /// The lease releases the gate on drop.
    pub async fn try_acquire(&self, user_id: i64, camera_id: i64) -> Option<ToggleLease> {
        let lock = self.get_or_create_lock((user_id, camera_id)).await;

        match lock.try_lock_owned() {
            Ok(guard) => {
                tracing::debug!(user_id = user_id, camera_id = camera_id, "Toggle gate acquired");
                Some(ToggleLease {
                    user_id,
                    camera_id,
                    _guard: guard,
                })
            }
            Err(_) => {
                tracing::debug!(
                    user_id = user_id,
                    camera_id = camera_id,
                    "Toggle gate busy - toggle already in flight"
                );
                None
            }
        }
    }

    async fn get_or_create_lock(&self, key: GateKey) -> Arc<Mutex<()>> {
        {
            let locks = self.locks.read().await;
            if let Some(lock) = locks.get(&key) {
                return lock.clone();
            }
        }

        let mut locks = self.locks.write().await;
        locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    #[cfg(test)]
    pub(crate) async fn gate_count(&self) -> usize {
        self.locks.read().await.len()
    }
}

impl Default for ToggleGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Held for the duration of one toggle
pub struct ToggleLease {
    user_id: i64,
    camera_id: i64,
    _guard: OwnedMutexGuard<()>,
}

impl ToggleLease {
    pub fn camera_id(&self) -> i64 {
        self.camera_id
    }
}

impl Drop for ToggleLease {
    fn drop(&mut self) {
        tracing::debug!(
            user_id = self.user_id,
            camera_id = self.camera_id,
            "Toggle gate released"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_second_acquire_refused_until_release() {
        let gate = ToggleGate::new();

        let lease = gate.try_acquire(1, 7).await.unwrap();
        assert_eq!(lease.camera_id(), 7);
        assert!(gate.try_acquire(1, 7).await.is_none());

        drop(lease);
        assert!(gate.try_acquire(1, 7).await.is_some());
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let gate = ToggleGate::new();

        let _a = gate.try_acquire(1, 7).await.unwrap();
        let _b = gate.try_acquire(1, 8).await.unwrap();
        let _c = gate.try_acquire(2, 7).await.unwrap();
        assert_eq!(gate.gate_count().await, 3);
    }
}
