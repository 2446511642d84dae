//! Shared models and types
//!
//! Entity types fetched from the InfoCam API and used by several modules
//! (remote client, favorites cache, sync coordinator, overlay pipeline).

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub session_active: bool,
    pub favorites_store: bool,
    pub requests_in_flight: usize,
    pub request_capacity: usize,
}

/// Traffic camera as published by the InfoCam API.
///
/// Immutable snapshot per fetch. Field aliases accept the API's wire names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub id: i64,
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(alias = "latitud")]
    pub latitude: f64,
    #[serde(alias = "longitud")]
    pub longitude: f64,
    /// URL of the live camera image
    #[serde(alias = "imagen", default)]
    pub image: Option<String>,
    #[serde(alias = "activa", default)]
    pub active: bool,
}

/// Traffic incident, either official (external authority) or user-reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub id: i64,
    /// Reporting user; absent or zero for official incidents
    #[serde(alias = "idUsuario", default)]
    pub user_id: Option<i64>,
    #[serde(alias = "externalId", default)]
    pub external_id: Option<String>,
    #[serde(alias = "nombre", default)]
    pub name: Option<String>,
    #[serde(alias = "tipoIncidencia", default)]
    pub category: Option<String>,
    #[serde(alias = "causa", default)]
    pub cause: Option<String>,
    /// ISO-8601 with explicit offset, e.g. `2025-01-27T10:00:00+01:00`
    #[serde(alias = "fechaInicio", alias = "fecha_inicio", default)]
    pub starts_at: Option<String>,
    #[serde(alias = "fechaFin", alias = "fecha_fin", default)]
    pub ends_at: Option<String>,
    #[serde(alias = "latitud")]
    pub latitude: f64,
    #[serde(alias = "longitud")]
    pub longitude: f64,
}

impl Incident {
    /// Official incidents carry a non-empty external authority id.
    /// The API serializes missing ids as the literal string `"null"` at times.
    pub fn is_official(&self) -> bool {
        matches!(self.external_id.as_deref(), Some(id) if !id.is_empty() && id != "null")
    }

    /// Compact `dd/MM HH:mm` period label for detail popups.
    ///
    /// Returns `None` when neither bound is set.
    pub fn display_period(&self) -> Option<String> {
        let start = present(self.starts_at.as_deref());
        let end = present(self.ends_at.as_deref());

        if start.is_none() && end.is_none() {
            return None;
        }

        let mut label = format!("Inicio: {}", start.map(short_timestamp).unwrap_or_default());
        if let Some(end) = end {
            label.push_str("\nFin: ");
            label.push_str(&short_timestamp(end));
        }
        Some(label)
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty() && *v != "null")
}

/// `2025-01-27T10:00:00+01:00` -> `27/01 10:00`; anything unparseable is returned as is.
fn short_timestamp(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%d/%m %H:%M").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
        return dt.format("%d/%m %H:%M").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return dt.format("%d/%m %H:%M").to_string();
    }
    raw.to_string()
}

/// Favorite state of a camera marker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FavoriteState {
    #[default]
    NotFavorite,
    Favorite,
}

impl FavoriteState {
    pub fn from_membership(is_favorite: bool) -> Self {
        if is_favorite {
            Self::Favorite
        } else {
            Self::NotFavorite
        }
    }

    pub fn is_favorite(self) -> bool {
        self == Self::Favorite
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::NotFavorite => Self::Favorite,
            Self::Favorite => Self::NotFavorite,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn incident(id: i64, external_id: Option<&str>) -> Incident {
        Incident {
            id,
            user_id: None,
            external_id: external_id.map(String::from),
            name: Some("Obras".to_string()),
            category: None,
            cause: None,
            starts_at: None,
            ends_at: None,
            latitude: 40.4167,
            longitude: -3.7037,
        }
    }

    #[test]
    fn test_is_official() {
        assert!(!incident(3, Some("")).is_official());
        assert!(incident(4, Some("GOB-99")).is_official());
        assert!(!incident(5, Some("null")).is_official());
        assert!(!incident(6, None).is_official());
    }

    #[test]
    fn test_camera_deserializes_wire_names() {
        let json = r#"{"id":7,"nombre":"Plaza Mayor","latitud":40.415,"longitud":-3.707,"imagen":"http://img/7.jpg","activa":true}"#;
        let camera: Camera = serde_json::from_str(json).unwrap();
        assert_eq!(camera.id, 7);
        assert_eq!(camera.name, "Plaza Mayor");
        assert_eq!(camera.image.as_deref(), Some("http://img/7.jpg"));
        assert!(camera.active);
    }

    #[test]
    fn test_incident_deserializes_null_external_id() {
        let json = r#"{"id":3,"idUsuario":9,"externalId":null,"nombre":"Choque","tipoIncidencia":"Accidente","causa":"Lluvia","fechaInicio":"2025-01-27T10:00:00+01:00","fechaFin":null,"latitud":40.0,"longitud":-3.0}"#;
        let incident: Incident = serde_json::from_str(json).unwrap();
        assert!(!incident.is_official());
        assert_eq!(incident.user_id, Some(9));
        assert_eq!(incident.category.as_deref(), Some("Accidente"));
    }

    #[test]
    fn test_display_period() {
        let mut i = incident(1, Some("GOB-1"));
        assert_eq!(i.display_period(), None);

        i.starts_at = Some("2025-01-27T10:00:00+01:00".to_string());
        i.ends_at = Some("null".to_string());
        assert_eq!(i.display_period().as_deref(), Some("Inicio: 27/01 10:00"));

        i.ends_at = Some("2025-01-28T18:30:00+01:00".to_string());
        assert_eq!(
            i.display_period().as_deref(),
            Some("Inicio: 27/01 10:00\nFin: 28/01 18:30")
        );

        i.starts_at = Some("mañana".to_string());
        i.ends_at = None;
        assert_eq!(i.display_period().as_deref(), Some("Inicio: mañana"));
    }

    #[test]
    fn test_favorite_state_toggle() {
        assert_eq!(FavoriteState::NotFavorite.toggled(), FavoriteState::Favorite);
        assert_eq!(FavoriteState::Favorite.toggled(), FavoriteState::NotFavorite);
        assert!(FavoriteState::from_membership(true).is_favorite());
        assert_eq!(FavoriteState::default(), FavoriteState::NotFavorite);
    }

    #[test]
    fn test_favorite_state_serialization() {
        let json = serde_json::to_string(&FavoriteState::NotFavorite).unwrap();
        assert_eq!(json, "\"not_favorite\"");
    }
}
