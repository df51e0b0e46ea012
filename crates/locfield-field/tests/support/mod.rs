//! Scripted places provider for controller tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use locfield_core::{Candidate, Coordinates, PlaceDetail};
use locfield_places::{AutocompleteRequest, PlacesError, PlacesLoader, PlacesSession, ProviderStatus};
use serde_json::{json, Value};
use tokio::sync::Notify;

/// Canned provider answers, shared between a test and the sessions it hands out.
#[derive(Default)]
pub struct Script {
    /// Candidates returned for an exact query text.
    pub predictions: HashMap<String, Vec<Candidate>>,
    /// Queries that wait for a notification before answering.
    pub gates: HashMap<String, Arc<Notify>>,
    pub details: HashMap<String, PlaceDetail>,
    pub fail_load: bool,
    pub loads: AtomicU32,
    pub requests: Mutex<Vec<AutocompleteRequest>>,
    pub detail_requests: Mutex<Vec<(String, Vec<String>)>>,
}

impl Script {
    pub fn with_predictions(mut self, query: &str, candidates: Vec<Candidate>) -> Self {
        self.predictions.insert(query.to_owned(), candidates);
        self
    }

    pub fn with_detail(mut self, detail: PlaceDetail) -> Self {
        self.details.insert(detail.id.clone(), detail);
        self
    }

    pub fn with_gate(mut self, query: &str, gate: Arc<Notify>) -> Self {
        self.gates.insert(query.to_owned(), gate);
        self
    }

    pub fn loads(&self) -> u32 {
        self.loads.load(Ordering::SeqCst)
    }
}

pub struct ScriptedLoader(pub Arc<Script>);

pub struct ScriptedSession(Arc<Script>);

impl PlacesLoader for ScriptedLoader {
    type Session = ScriptedSession;

    async fn load(&self, api_key: &str) -> Result<ScriptedSession, PlacesError> {
        self.0.loads.fetch_add(1, Ordering::SeqCst);
        if self.0.fail_load {
            return Err(PlacesError::ProviderLoad(format!("rejected key {api_key}")));
        }
        Ok(ScriptedSession(Arc::clone(&self.0)))
    }
}

impl PlacesSession for ScriptedSession {
    async fn predictions(&self, request: &AutocompleteRequest) -> Result<Vec<Candidate>, PlacesError> {
        self.0.requests.lock().unwrap().push(request.clone());
        if let Some(gate) = self.0.gates.get(&request.input) {
            gate.notified().await;
        }
        Ok(self
            .0
            .predictions
            .get(&request.input)
            .cloned()
            .unwrap_or_default())
    }

    async fn details(&self, place_id: &str, fields: &[String]) -> Result<PlaceDetail, PlacesError> {
        self.0
            .detail_requests
            .lock()
            .unwrap()
            .push((place_id.to_owned(), fields.to_vec()));
        self.0
            .details
            .get(place_id)
            .cloned()
            .ok_or(PlacesError::Status {
                operation: "details",
                status: ProviderStatus::NotFound,
                message: None,
            })
    }

    async fn opening_hours(&self, _place_id: &str) -> Result<Option<Value>, PlacesError> {
        Ok(None)
    }
}

pub fn candidate(id: &str, description: &str) -> Candidate {
    Candidate {
        id: id.to_owned(),
        description: description.to_owned(),
        raw: json!({ "place_id": id, "description": description }),
    }
}

pub fn detail(id: &str, lat: f64, lng: f64) -> PlaceDetail {
    PlaceDetail {
        id: id.to_owned(),
        coordinates: Coordinates { lat, lng },
        photos: None,
        opening_hours: None,
        raw: json!({ "geometry": { "location": { "lat": lat, "lng": lng } } }),
    }
}
