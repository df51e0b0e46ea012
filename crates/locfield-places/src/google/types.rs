//! Google Places web service response envelopes.
//!
//! Both legacy endpoints wrap their payload as `{"status": "OK", ...}`, with an
//! optional `error_message` on failure. Predictions and detail results are
//! kept as raw JSON so they can be passed through to the persisted value.

use serde::Deserialize;
use serde_json::Value;

/// `GET /maps/api/place/autocomplete/json`
#[derive(Debug, Deserialize)]
pub(crate) struct AutocompleteResponse {
    pub status: String,
    #[serde(default)]
    pub predictions: Vec<Value>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// `GET /maps/api/place/details/json`
#[derive(Debug, Deserialize)]
pub(crate) struct DetailsResponse {
    pub status: String,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// `GET /v1/places/{id}` (Places API New), restricted by field mask.
#[derive(Debug, Deserialize)]
pub(crate) struct PlaceV1Response {
    #[serde(rename = "regularOpeningHours", default)]
    pub regular_opening_hours: Option<Value>,
}
