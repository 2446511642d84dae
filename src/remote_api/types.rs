//! InfoCam API wire types

use serde::{Deserialize, Serialize};

/// Categories offered when the remote list cannot be fetched
pub const FALLBACK_INCIDENT_TYPES: [&str; 4] = ["Accidente", "Obras", "Retención", "Clima"];

/// `POST auth/login` body
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// `POST auth/login` response (the remote user record)
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub token: Option<String>,
}

/// New account, as entered on the registration form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: i64,
}

/// `POST auth/registro` body. Self-registered accounts are never admins.
#[derive(Debug, Serialize)]
pub(crate) struct RegistrationPayload<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub email: &'a str,
    #[serde(rename = "nombre")]
    pub first_name: &'a str,
    #[serde(rename = "apellido")]
    pub last_name: &'a str,
    #[serde(rename = "telefono")]
    pub phone: i64,
    pub is_admin: bool,
}

impl<'a> From<&'a NewUser> for RegistrationPayload<'a> {
    fn from(user: &'a NewUser) -> Self {
        Self {
            username: &user.username,
            password: &user.password,
            email: &user.email,
            first_name: &user.first_name,
            last_name: &user.last_name,
            phone: user.phone,
            is_admin: false,
        }
    }
}

/// `PUT usuarios/{id}` body. The password is only sent when changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(rename = "nombre")]
    pub first_name: String,
    pub email: String,
    #[serde(rename = "telefono")]
    pub phone: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Remote user record returned by profile updates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(alias = "nombre", alias = "firstName", default)]
    pub first_name: String,
    #[serde(alias = "apellido", alias = "lastName", default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(alias = "telefono", default)]
    pub phone: i64,
    #[serde(alias = "is_admin", alias = "admin", default)]
    pub is_admin: bool,
}

/// User incident report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewIncident {
    pub user_id: i64,
    pub name: String,
    pub category: String,
    pub cause: String,
    /// `yyyy-MM-ddTHH:mm` or full ISO-8601
    pub starts_at: String,
    #[serde(default)]
    pub ends_at: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

/// Reference to the reporting user, as nested by the API
#[derive(Debug, Serialize)]
pub(crate) struct UserRef {
    pub id: i64,
}

/// `POST incidencias` body
#[derive(Debug, Serialize)]
pub(crate) struct IncidentPayload<'a> {
    #[serde(rename = "usuario")]
    pub user: UserRef,
    #[serde(rename = "nombre")]
    pub name: &'a str,
    #[serde(rename = "tipoIncidencia")]
    pub category: &'a str,
    #[serde(rename = "causa")]
    pub cause: &'a str,
    #[serde(rename = "latitud")]
    pub latitude: f64,
    #[serde(rename = "longitud")]
    pub longitude: f64,
    #[serde(rename = "fecha_inicio")]
    pub starts_at: &'a str,
    #[serde(rename = "fecha_fin")]
    pub ends_at: Option<&'a str>,
}

impl<'a> From<&'a NewIncident> for IncidentPayload<'a> {
    fn from(incident: &'a NewIncident) -> Self {
        Self {
            user: UserRef {
                id: incident.user_id,
            },
            name: &incident.name,
            category: &incident.category,
            cause: &incident.cause,
            latitude: incident.latitude,
            longitude: incident.longitude,
            starts_at: &incident.starts_at,
            ends_at: incident.ends_at.as_deref(),
        }
    }
}
