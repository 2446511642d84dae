//! In-process `RemoteDataService` for unit tests

use super::types::{NewIncident, NewUser, ProfileUpdate, UserProfile};
use super::RemoteDataService;
use crate::error::{Error, Result};
use crate::models::{Camera, Incident};
use crate::session::Session;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Scripted reply
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    Offline,
    Rejected(u16),
}

impl<T: Clone> Reply<T> {
    fn result(&self) -> Result<T> {
        match self {
            Reply::Ok(v) => Ok(v.clone()),
            Reply::Offline => Err(Error::Transport("connection refused".to_string())),
            Reply::Rejected(status) => Err(Error::RemoteRejection {
                status: *status,
                message: "rejected".to_string(),
            }),
        }
    }
}

pub struct FakeRemote {
    pub login: Mutex<Reply<()>>,
    pub favorites: Mutex<Reply<Option<Vec<Camera>>>>,
    pub cameras: Mutex<Reply<Vec<Camera>>>,
    pub incidents: Mutex<Reply<Vec<Incident>>>,
    pub toggle: Mutex<Reply<()>>,
    pub toggle_delay: Mutex<Option<Duration>>,
    pub cameras_delay: Mutex<Option<Duration>>,
    pub toggle_calls: AtomicUsize,
    pub camera_calls: AtomicUsize,
    pub incident_types: Mutex<Reply<Vec<String>>>,
    pub created: Mutex<Vec<NewIncident>>,
    pub registered: Mutex<Vec<NewUser>>,
    pub profile_updates: Mutex<Vec<(i64, ProfileUpdate)>>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self {
            login: Mutex::new(Reply::Ok(())),
            favorites: Mutex::new(Reply::Ok(Some(Vec::new()))),
            cameras: Mutex::new(Reply::Ok(Vec::new())),
            incidents: Mutex::new(Reply::Ok(Vec::new())),
            toggle: Mutex::new(Reply::Ok(())),
            toggle_delay: Mutex::new(None),
            cameras_delay: Mutex::new(None),
            toggle_calls: AtomicUsize::new(0),
            camera_calls: AtomicUsize::new(0),
            incident_types: Mutex::new(Reply::Offline),
            created: Mutex::new(Vec::new()),
            registered: Mutex::new(Vec::new()),
            profile_updates: Mutex::new(Vec::new()),
        }
    }

    pub fn set_favorites(&self, reply: Reply<Option<Vec<Camera>>>) {
        *self.favorites.lock().unwrap() = reply;
    }

    pub fn set_cameras(&self, reply: Reply<Vec<Camera>>) {
        *self.cameras.lock().unwrap() = reply;
    }

    pub fn set_incidents(&self, reply: Reply<Vec<Incident>>) {
        *self.incidents.lock().unwrap() = reply;
    }

    pub fn set_toggle(&self, reply: Reply<()>) {
        *self.toggle.lock().unwrap() = reply;
    }

    pub fn set_login(&self, reply: Reply<()>) {
        *self.login.lock().unwrap() = reply;
    }

    pub fn set_incident_types(&self, reply: Reply<Vec<String>>) {
        *self.incident_types.lock().unwrap() = reply;
    }

    pub fn toggle_calls(&self) -> usize {
        self.toggle_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteDataService for FakeRemote {
    async fn login(&self, username: &str, _password: &str) -> Result<Session> {
        let reply = self.login.lock().unwrap().clone();
        reply.result()?;
        Ok(Session {
            user_id: 1,
            username: username.to_string(),
            token: "fake-token".to_string(),
        })
    }

    async fn register(&self, user: &NewUser) -> Result<()> {
        self.registered.lock().unwrap().push(user.clone());
        Ok(())
    }

    async fn update_profile(
        &self,
        _credential: &str,
        user_id: i64,
        update: &ProfileUpdate,
    ) -> Result<UserProfile> {
        self.profile_updates
            .lock()
            .unwrap()
            .push((user_id, update.clone()));
        Ok(UserProfile {
            id: user_id,
            username: "ana".to_string(),
            first_name: update.first_name.clone(),
            last_name: "García".to_string(),
            email: update.email.clone(),
            phone: update.phone,
            is_admin: false,
        })
    }

    async fn fetch_favorite_cameras(&self, _credential: &str, _user_id: i64) -> Result<Option<Vec<Camera>>> {
        let reply = self.favorites.lock().unwrap().clone();
        reply.result()
    }

    async fn fetch_active_cameras(&self, _credential: &str) -> Result<Vec<Camera>> {
        self.camera_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.cameras_delay.lock().unwrap();
        let reply = self.cameras.lock().unwrap().clone();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        reply.result()
    }

    async fn fetch_active_incidents(
        &self,
        _credential: &str,
        _as_of: NaiveDateTime,
        _user_id: Option<i64>,
    ) -> Result<Vec<Incident>> {
        let reply = self.incidents.lock().unwrap().clone();
        reply.result()
    }

    async fn toggle_favorite(&self, _credential: &str, _camera_id: i64, _user_id: i64) -> Result<()> {
        self.toggle_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.toggle_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let reply = self.toggle.lock().unwrap().clone();
        reply.result()
    }

    async fn fetch_incident_types(&self, _credential: &str) -> Result<Vec<String>> {
        let reply = self.incident_types.lock().unwrap().clone();
        reply.result()
    }

    async fn create_incident(&self, _credential: &str, incident: &NewIncident) -> Result<()> {
        self.created.lock().unwrap().push(incident.clone());
        Ok(())
    }
}

pub fn camera(id: i64, name: &str) -> Camera {
    Camera {
        id,
        name: name.to_string(),
        latitude: 40.0 + id as f64 / 100.0,
        longitude: -3.7,
        image: Some(format!("http://img/{}.jpg", id)),
        active: true,
    }
}

pub fn incident(id: i64, external_id: Option<&str>) -> Incident {
    Incident {
        id,
        user_id: if external_id.map_or(true, |e| e.is_empty()) {
            Some(9)
        } else {
            None
        },
        external_id: external_id.map(String::from),
        name: Some(format!("Incidencia {}", id)),
        category: Some("Obras".to_string()),
        cause: Some("Mantenimiento".to_string()),
        starts_at: Some("2025-01-27T10:00:00+01:00".to_string()),
        ends_at: None,
        latitude: 40.4,
        longitude: -3.7,
    }
}
