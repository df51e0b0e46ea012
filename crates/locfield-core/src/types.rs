//! Data model shared between the configuration endpoint, the places provider
//! and the field controller.
//!
//! ## Configuration endpoint shape
//!
//! `GET /location-field/config` returns:
//!
//! ```json
//! {
//!   "googleMapsApiKey": "AIza...",
//!   "fields": ["formatted_address", "photo"],
//!   "autocompletionRequestOptions": { "types": ["geocode"] }
//! }
//! ```
//!
//! Hosts with an unconfigured plugin send `null` for `fields` and
//! `autocompletionRequestOptions`; both are treated as empty.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::UnknownAxis;

/// Detail field that must always be requested, since coordinates live there.
pub const GEOMETRY_FIELD: &str = "geometry";

/// Per-field provider configuration fetched once at mount.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(rename = "googleMapsApiKey", default, deserialize_with = "null_as_default")]
    pub provider_key: String,
    #[serde(rename = "fields", default, deserialize_with = "null_as_default")]
    pub detail_fields: Vec<String>,
    #[serde(
        rename = "autocompletionRequestOptions",
        default,
        deserialize_with = "null_as_default"
    )]
    pub autocomplete_options: Map<String, Value>,
}

impl Configuration {
    /// Appends [`GEOMETRY_FIELD`] to the detail fields unless already present.
    ///
    /// Idempotent: calling it again never duplicates the entry.
    pub fn ensure_geometry(&mut self) {
        if !self.detail_fields.iter().any(|f| f == GEOMETRY_FIELD) {
            self.detail_fields.push(GEOMETRY_FIELD.to_owned());
        }
    }

    /// Consuming form of [`Configuration::ensure_geometry`].
    #[must_use]
    pub fn with_geometry(mut self) -> Self {
        self.ensure_geometry();
        self
    }

    /// Whether the given detail field was requested.
    #[must_use]
    pub fn requests_field(&self, field: &str) -> bool {
        self.detail_fields.iter().any(|f| f == field)
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("provider_key", &"[redacted]")
            .field("detail_fields", &self.detail_fields)
            .field("autocomplete_options", &self.autocomplete_options)
            .finish()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A provider-suggested place matching partial text input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    /// Opaque provider place identifier.
    pub id: String,
    pub description: String,
    /// Untouched provider payload for this prediction.
    pub raw: Value,
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub url: String,
}

/// Full detail for a selected place.
///
/// `raw` is the provider's detail object as returned; it is passed through
/// into the persisted value untouched apart from photo URLs and opening hours.
/// `opening_hours` is the detail response's own hours object, used when the
/// dedicated opening-hours lookup yields nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceDetail {
    pub id: String,
    pub coordinates: Coordinates,
    pub photos: Option<Vec<Photo>>,
    pub opening_hours: Option<Value>,
    pub raw: Value,
}

/// Coordinate axis targeted by a manual coordinate edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Lat,
    Lng,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Lat => write!(f, "lat"),
            Axis::Lng => write!(f, "lng"),
        }
    }
}

impl FromStr for Axis {
    type Err = UnknownAxis;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lat" | "latitude" => Ok(Axis::Lat),
            "lng" | "lon" | "longitude" => Ok(Axis::Lng),
            _ => Err(UnknownAxis(s.to_owned())),
        }
    }
}
