//! Session Context
//!
//! In-memory holder of the signed-in user and bearer credential.
//! Login/logout are broadcast over a `watch` channel so the map session can
//! refresh or tear down its favorites without polling.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: i64,
    pub username: String,
    /// Bearer token, without the `Bearer ` prefix
    #[serde(skip_serializing)]
    pub token: String,
}

/// Current session holder
pub struct SessionStore {
    tx: watch::Sender<Option<Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Replace the current session (single active session)
    pub fn begin(&self, session: Session) {
        tracing::info!(user_id = session.user_id, username = %session.username, "Session started");
        self.tx.send_replace(Some(session));
    }

    /// End the current session, returning it if there was one
    pub fn end(&self) -> Option<Session> {
        let previous = self.tx.send_replace(None);
        if let Some(ref session) = previous {
            tracing::info!(user_id = session.user_id, "Session ended");
        }
        previous
    }

    pub fn current(&self) -> Option<Session> {
        self.tx.borrow().clone()
    }

    /// Current session or `Unauthorized`
    pub fn require(&self) -> crate::Result<Session> {
        self.current()
            .ok_or_else(|| crate::Error::Unauthorized("No active session".to_string()))
    }

    pub fn is_active(&self) -> bool {
        self.tx.borrow().is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.tx.subscribe()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
