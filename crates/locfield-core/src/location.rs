//! The persisted location value.
//!
//! A location is either absent, resolved against the places provider, or
//! declared by hand. The `place_id` [`CUSTOM_LOCATION_ID`] marks a custom
//! value on the wire and never appears on a resolved one.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde_json::Value;

use crate::types::Axis;

/// Wire identifier carried by every custom location.
pub const CUSTOM_LOCATION_ID: &str = "custom_location";

const MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/?api=1";

#[derive(Debug, Clone, Default, PartialEq)]
pub enum LocationValue {
    #[default]
    Empty,
    Resolved(ResolvedLocation),
    Custom(CustomLocation),
}

/// A place backed by a genuine provider identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub description: String,
    pub place_id: String,
    pub lat: f64,
    pub lng: f64,
    /// Provider detail object, passed through as returned.
    pub details: Option<Value>,
    pub regular_opening_hours: Option<Value>,
}

/// A user-declared place with hand-entered (or missing) coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomLocation {
    pub description: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl CustomLocation {
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            lat: None,
            lng: None,
        }
    }
}

impl LocationValue {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, LocationValue::Empty)
    }

    #[must_use]
    pub fn is_custom(&self) -> bool {
        matches!(self, LocationValue::Custom(_))
    }

    /// Wire `place_id` of the value, or `None` when empty.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            LocationValue::Empty => None,
            LocationValue::Resolved(r) => Some(&r.place_id),
            LocationValue::Custom(_) => Some(CUSTOM_LOCATION_ID),
        }
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        match self {
            LocationValue::Empty => None,
            LocationValue::Resolved(r) => Some(&r.description),
            LocationValue::Custom(c) => Some(&c.description),
        }
    }

    #[must_use]
    pub fn coordinate(&self, axis: Axis) -> Option<f64> {
        match (self, axis) {
            (LocationValue::Empty, _) => None,
            (LocationValue::Resolved(r), Axis::Lat) => Some(r.lat),
            (LocationValue::Resolved(r), Axis::Lng) => Some(r.lng),
            (LocationValue::Custom(c), Axis::Lat) => c.lat,
            (LocationValue::Custom(c), Axis::Lng) => c.lng,
        }
    }

    /// Returns a copy with one coordinate axis replaced, every other field kept.
    ///
    /// An empty value becomes a custom location with an empty description.
    /// Resolved values always carry both coordinates, so clearing an axis on
    /// one leaves it unchanged. Non-finite coordinates have no JSON form and
    /// are ignored on every variant.
    #[must_use]
    pub fn with_coordinate(&self, axis: Axis, coordinate: Option<f64>) -> LocationValue {
        if let Some(c) = coordinate.filter(|c| !c.is_finite()) {
            tracing::warn!(%axis, coordinate = %c, "ignoring non-finite coordinate");
            return self.clone();
        }
        match self {
            LocationValue::Empty => {
                LocationValue::Custom(CustomLocation::default()).with_coordinate(axis, coordinate)
            }
            LocationValue::Custom(c) => {
                let mut next = c.clone();
                match axis {
                    Axis::Lat => next.lat = coordinate,
                    Axis::Lng => next.lng = coordinate,
                }
                LocationValue::Custom(next)
            }
            LocationValue::Resolved(r) => {
                let Some(coordinate) = coordinate else {
                    tracing::debug!(
                        place_id = %r.place_id,
                        %axis,
                        "ignoring cleared coordinate on resolved location"
                    );
                    return self.clone();
                };
                let mut next = r.clone();
                match axis {
                    Axis::Lat => next.lat = coordinate,
                    Axis::Lng => next.lng = coordinate,
                }
                LocationValue::Resolved(next)
            }
        }
    }

    /// Google Maps search link for a resolved place.
    #[must_use]
    pub fn maps_url(&self) -> Option<String> {
        let LocationValue::Resolved(r) = self else {
            return None;
        };
        Some(format!(
            "{MAPS_SEARCH_URL}&query={}&query_place_id={}",
            utf8_percent_encode(&r.description, NON_ALPHANUMERIC),
            utf8_percent_encode(&r.place_id, NON_ALPHANUMERIC),
        ))
    }
}
