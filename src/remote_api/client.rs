//! reqwest binding of the InfoCam REST API

use super::types::*;
use super::RemoteDataService;
use crate::error::{Error, Result};
use crate::models::{Camera, Incident};
use crate::session::Session;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::header::AUTHORIZATION;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

/// InfoCam HTTP client
#[derive(Clone)]
pub struct InfocamClient {
    client: reqwest::Client,
    base_url: String,
}

impl InfocamClient {
    /// Create a client for the given API root (e.g. `http://host:8080/api/`)
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder, credential: &str) -> RequestBuilder {
        if credential.is_empty() {
            builder
        } else {
            builder.header(AUTHORIZATION, format!("Bearer {}", credential))
        }
    }

    /// Turn a non-success status into `RemoteRejection`
    async fn check(resp: Response, what: &str) -> Result<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        debug!(status = %status, body = %body, "{} rejected", what);
        Err(Error::RemoteRejection {
            status: status.as_u16(),
            message: format!("{} failed", what),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, credential: &str, what: &str) -> Result<T> {
        let resp = self
            .authorized(self.client.get(self.url(path)), credential)
            .send()
            .await?;
        let resp = Self::check(resp, what).await?;
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl RemoteDataService for InfocamClient {
    async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let resp = self
            .client
            .post(self.url("auth/login"))
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::RemoteRejection {
                status: status.as_u16(),
                message: format!("Credenciales incorrectas (Código: {})", status.as_u16()),
            });
        }

        // The token may come back in the Authorization header or in the body
        let header_token = resp
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let user: LoginResponse = resp.json().await?;

        let token = user
            .token
            .or(header_token)
            .map(|t| t.trim_start_matches("Bearer ").to_string())
            .unwrap_or_default();

        Ok(Session {
            user_id: user.id,
            username: if user.username.is_empty() {
                username.to_string()
            } else {
                user.username
            },
            token,
        })
    }

    async fn register(&self, user: &NewUser) -> Result<()> {
        let resp = self
            .client
            .post(self.url("auth/registro"))
            .json(&RegistrationPayload::from(user))
            .send()
            .await?;
        Self::check(resp, "Registration").await?;
        Ok(())
    }

    async fn update_profile(
        &self,
        credential: &str,
        user_id: i64,
        update: &ProfileUpdate,
    ) -> Result<UserProfile> {
        let path = format!("usuarios/{}", user_id);
        let resp = self
            .authorized(self.client.put(self.url(&path)), credential)
            .json(update)
            .send()
            .await?;
        let resp = Self::check(resp, "Profile update").await?;
        Ok(resp.json().await?)
    }

    async fn fetch_favorite_cameras(
        &self,
        credential: &str,
        user_id: i64,
    ) -> Result<Option<Vec<Camera>>> {
        let path = format!("usuarios/{}/favoritos/camaras", user_id);
        let resp = self
            .authorized(self.client.get(self.url(&path)), credential)
            .send()
            .await?;
        let resp = Self::check(resp, "Favorites sync").await?;

        let body = resp.text().await?;
        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(None);
        }
        let cameras: Vec<Camera> =
            serde_json::from_str(trimmed).map_err(|e| Error::Parse(e.to_string()))?;
        Ok(Some(cameras))
    }

    async fn fetch_active_cameras(&self, credential: &str) -> Result<Vec<Camera>> {
        self.get_json("camaras/activas", credential, "Camera download")
            .await
    }

    async fn fetch_active_incidents(
        &self,
        credential: &str,
        as_of: NaiveDateTime,
        user_id: Option<i64>,
    ) -> Result<Vec<Incident>> {
        let mut path = format!("incidencias/activas?fecha={}", as_of.format("%Y-%m-%dT%H:%M"));
        if let Some(user_id) = user_id {
            path.push_str(&format!("&usuarioId={}", user_id));
        }
        self.get_json(&path, credential, "Incident download").await
    }

    async fn toggle_favorite(&self, credential: &str, camera_id: i64, user_id: i64) -> Result<()> {
        let path = format!("camaras/{}/favorita?usuarioId={}", camera_id, user_id);
        let resp = self
            .authorized(self.client.post(self.url(&path)), credential)
            .send()
            .await?;
        Self::check(resp, "Favorite toggle").await?;
        Ok(())
    }

    async fn fetch_incident_types(&self, credential: &str) -> Result<Vec<String>> {
        self.get_json("incidencias/tipos", credential, "Incident types")
            .await
    }

    async fn create_incident(&self, credential: &str, incident: &NewIncident) -> Result<()> {
        let payload = IncidentPayload::from(incident);
        let resp = self
            .authorized(self.client.post(self.url("incidencias")), credential)
            .json(&payload)
            .send()
            .await?;
        Self::check(resp, "Incident report").await?;
        Ok(())
    }
}
