//! String codec for the persisted location value.
//!
//! The host form stores the field as a JSON string:
//!
//! - resolved: `{"description", "place_id", "lat", "lng", "details"?, "regularOpeningHours"?}`
//! - custom: `{"description", "place_id": "custom_location", "lat": number|null, "lng": number|null}`
//! - empty: the literal string `"null"`, an empty string, or no value at all
//!
//! This is the only place that looks at raw value contents; everything else
//! works on [`LocationValue`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DecodeError;
use crate::location::{CustomLocation, LocationValue, ResolvedLocation, CUSTOM_LOCATION_ID};
use crate::types::Axis;

/// Wire representation of [`LocationValue::Empty`].
pub const NULL_SENTINEL: &str = "null";

/// A field value as handed over by the host form.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    /// String-encoded value (including the `"null"` sentinel).
    Text(String),
    /// A value the host already decoded into JSON.
    Json(Value),
}

impl From<Option<String>> for RawValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(RawValue::Null, RawValue::Text)
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_owned())
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        RawValue::Json(value)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireLocation {
    #[serde(default)]
    description: String,
    place_id: String,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lng: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
    #[serde(
        rename = "regularOpeningHours",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    regular_opening_hours: Option<Value>,
}

impl WireLocation {
    fn into_location(self) -> Result<LocationValue, DecodeError> {
        if self.place_id == CUSTOM_LOCATION_ID {
            return Ok(LocationValue::Custom(CustomLocation {
                description: self.description,
                lat: self.lat,
                lng: self.lng,
            }));
        }
        let lat = self.lat.ok_or_else(|| DecodeError::MissingCoordinate {
            place_id: self.place_id.clone(),
            axis: Axis::Lat,
        })?;
        let lng = self.lng.ok_or_else(|| DecodeError::MissingCoordinate {
            place_id: self.place_id.clone(),
            axis: Axis::Lng,
        })?;
        Ok(LocationValue::Resolved(ResolvedLocation {
            description: self.description,
            place_id: self.place_id,
            lat,
            lng,
            details: self.details,
            regular_opening_hours: self.regular_opening_hours,
        }))
    }

    fn from_location(value: &LocationValue) -> Option<Self> {
        match value {
            LocationValue::Empty => None,
            LocationValue::Resolved(r) => Some(Self {
                description: r.description.clone(),
                place_id: r.place_id.clone(),
                lat: Some(r.lat),
                lng: Some(r.lng),
                details: r.details.clone(),
                regular_opening_hours: r.regular_opening_hours.clone(),
            }),
            LocationValue::Custom(c) => Some(Self {
                description: c.description.clone(),
                place_id: CUSTOM_LOCATION_ID.to_owned(),
                lat: c.lat,
                lng: c.lng,
                details: None,
                regular_opening_hours: None,
            }),
        }
    }
}

/// Encodes a location value into its persisted string form.
#[must_use]
pub fn encode(value: &LocationValue) -> String {
    let Some(wire) = WireLocation::from_location(value) else {
        return NULL_SENTINEL.to_owned();
    };
    match serde_json::to_string(&wire) {
        Ok(encoded) => encoded,
        Err(e) => {
            tracing::error!(error = %e, "failed to encode location value, emitting null");
            NULL_SENTINEL.to_owned()
        }
    }
}

/// Strictly decodes a string-encoded location value.
///
/// # Errors
///
/// - [`DecodeError::Json`] if the input is not valid JSON.
/// - [`DecodeError::NotAnObject`] if the JSON is neither `null` nor an object.
/// - [`DecodeError::MissingCoordinate`] if a resolved record lacks `lat`/`lng`.
pub fn try_decode(input: &str) -> Result<LocationValue, DecodeError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed == NULL_SENTINEL {
        return Ok(LocationValue::Empty);
    }
    let json: Value = serde_json::from_str(trimmed)?;
    decode_json(json)
}

fn decode_json(json: Value) -> Result<LocationValue, DecodeError> {
    match json {
        Value::Null => Ok(LocationValue::Empty),
        Value::Object(_) => serde_json::from_value::<WireLocation>(json)?.into_location(),
        // A string inside JSON is a double-encoded value.
        Value::String(inner) => try_decode(&inner),
        Value::Bool(_) => Err(DecodeError::NotAnObject { kind: "boolean" }),
        Value::Number(_) => Err(DecodeError::NotAnObject { kind: "number" }),
        Value::Array(_) => Err(DecodeError::NotAnObject { kind: "array" }),
    }
}

/// Decodes whatever the host handed over.
///
/// Already-structured input is converted without a string round trip.
/// Malformed input is logged and yields `None`, which callers treat as empty.
#[must_use]
pub fn decode(raw: &RawValue) -> Option<LocationValue> {
    let result = match raw {
        RawValue::Null => Ok(LocationValue::Empty),
        RawValue::Text(text) => try_decode(text),
        RawValue::Json(json) => decode_json(json.clone()),
    };
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(error = %e, "failed to decode location value");
            None
        }
    }
}

/// [`decode`], with malformed input collapsed to [`LocationValue::Empty`].
#[must_use]
pub fn decode_or_empty(raw: &RawValue) -> LocationValue {
    decode(raw).unwrap_or_default()
}
