//! In-process provider used by unit tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use locfield_core::{Candidate, Coordinates, PlaceDetail, Photo};
use serde_json::{json, Value};
use tokio::sync::Notify;

use crate::error::PlacesError;
use crate::provider::{AutocompleteRequest, PlacesLoader, PlacesSession, ProviderStatus};

pub(crate) fn candidate(id: &str, description: &str) -> Candidate {
    Candidate {
        id: id.to_owned(),
        description: description.to_owned(),
        raw: json!({ "place_id": id, "description": description }),
    }
}

pub(crate) fn detail(id: &str, lat: f64, lng: f64) -> PlaceDetail {
    PlaceDetail {
        id: id.to_owned(),
        coordinates: Coordinates { lat, lng },
        photos: None,
        opening_hours: None,
        raw: json!({ "place_id": id, "geometry": { "location": { "lat": lat, "lng": lng } } }),
    }
}

fn status_error(operation: &'static str, status: &ProviderStatus) -> PlacesError {
    PlacesError::Status {
        operation,
        status: status.clone(),
        message: None,
    }
}

pub(crate) struct FakeSession {
    pub predictions: Result<Vec<Candidate>, ProviderStatus>,
    pub details: Result<PlaceDetail, ProviderStatus>,
    pub opening_hours: Result<Option<Value>, ProviderStatus>,
    pub requests: Mutex<Vec<AutocompleteRequest>>,
    pub detail_fields: Mutex<Vec<Vec<String>>>,
    pub opening_hours_calls: AtomicU32,
}

impl Default for FakeSession {
    fn default() -> Self {
        Self {
            predictions: Ok(Vec::new()),
            details: Err(ProviderStatus::NotFound),
            opening_hours: Ok(None),
            requests: Mutex::new(Vec::new()),
            detail_fields: Mutex::new(Vec::new()),
            opening_hours_calls: AtomicU32::new(0),
        }
    }
}

impl PlacesSession for FakeSession {
    async fn predictions(
        &self,
        request: &AutocompleteRequest,
    ) -> Result<Vec<Candidate>, PlacesError> {
        self.requests.lock().unwrap().push(request.clone());
        self.predictions
            .clone()
            .map_err(|s| status_error("autocomplete", &s))
    }

    async fn details(&self, _place_id: &str, fields: &[String]) -> Result<PlaceDetail, PlacesError> {
        self.detail_fields.lock().unwrap().push(fields.to_vec());
        self.details.clone().map_err(|s| status_error("details", &s))
    }

    async fn opening_hours(&self, _place_id: &str) -> Result<Option<Value>, PlacesError> {
        self.opening_hours_calls.fetch_add(1, Ordering::SeqCst);
        self.opening_hours
            .clone()
            .map_err(|s| status_error("opening hours", &s))
    }
}

/// Loader that counts initializations and can be held open on a gate.
#[derive(Default)]
pub(crate) struct FakeLoader {
    pub loads: AtomicU32,
    pub gate: Option<Arc<Notify>>,
    pub fail: bool,
}

impl PlacesLoader for FakeLoader {
    type Session = FakeSession;

    async fn load(&self, api_key: &str) -> Result<FakeSession, PlacesError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail {
            return Err(PlacesError::ProviderLoad(format!("rejected key {api_key}")));
        }
        Ok(FakeSession::default())
    }
}

pub(crate) fn photo(url: &str) -> Photo {
    Photo {
        url: url.to_owned(),
    }
}
