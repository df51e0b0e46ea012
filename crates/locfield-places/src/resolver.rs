//! Turns a selected candidate into a resolved location value.

use locfield_core::{Candidate, CustomLocation, LocationValue, PlaceDetail, ResolvedLocation};
use serde_json::{Map, Value};

use crate::error::PlacesError;
use crate::provider::PlacesSession;

const PHOTO_FIELDS: [&str; 2] = ["photo", "photos"];

#[derive(Debug, Clone)]
pub struct PlaceResolver {
    fetch_opening_hours: bool,
}

impl Default for PlaceResolver {
    fn default() -> Self {
        Self {
            fetch_opening_hours: true,
        }
    }
}

impl PlaceResolver {
    #[must_use]
    pub fn new(fetch_opening_hours: bool) -> Self {
        Self {
            fetch_opening_hours,
        }
    }

    /// Resolves `candidate_id` against the current candidate list.
    ///
    /// Returns `None`, leaving the caller's value untouched, when the id is no
    /// longer listed (a newer search replaced the list) or when the detail
    /// lookup fails. Opening hours come from the dedicated lookup, falling
    /// back to the hours carried by the detail response when that lookup is
    /// disabled, fails or finds none.
    pub async fn resolve<S: PlacesSession>(
        &self,
        session: &S,
        candidate_id: &str,
        candidates: &[Candidate],
        detail_fields: &[String],
    ) -> Option<LocationValue> {
        let Some(candidate) = candidates.iter().find(|c| c.id == candidate_id) else {
            tracing::debug!(place_id = %candidate_id, "selection no longer in candidate list, ignoring");
            return None;
        };

        let detail = match session.details(candidate_id, detail_fields).await {
            Ok(detail) => detail,
            Err(PlacesError::Status {
                status, message, ..
            }) => {
                tracing::warn!(place_id = %candidate_id, %status, message = ?message, "place detail returned non-OK status");
                return None;
            }
            Err(e) => {
                tracing::warn!(place_id = %candidate_id, error = %e, "place detail lookup failed");
                return None;
            }
        };

        let looked_up = if self.fetch_opening_hours {
            match session.opening_hours(candidate_id).await {
                Ok(hours) => hours,
                Err(e) => {
                    tracing::warn!(place_id = %candidate_id, error = %e, "opening hours lookup failed, using detail hours");
                    None
                }
            }
        } else {
            None
        };
        let opening_hours = looked_up.or_else(|| detail.opening_hours.clone());

        let wants_photos = detail_fields
            .iter()
            .any(|f| PHOTO_FIELDS.contains(&f.as_str()));
        let coordinates = detail.coordinates;
        let detail_id = detail.id.clone();
        let details = compose_details(detail, wants_photos, opening_hours.as_ref());

        tracing::info!(place_id = %detail_id, "place resolved");
        Some(LocationValue::Resolved(ResolvedLocation {
            description: candidate.description.clone(),
            place_id: candidate.id.clone(),
            lat: coordinates.lat,
            lng: coordinates.lng,
            details: Some(details),
            regular_opening_hours: opening_hours,
        }))
    }

    /// Declares a location the provider did not find. No network call.
    #[must_use]
    pub fn create_custom(free_text: &str) -> LocationValue {
        LocationValue::Custom(CustomLocation::new(free_text))
    }
}

/// Folds photo URLs and opening hours into the raw provider detail object.
fn compose_details(detail: PlaceDetail, wants_photos: bool, opening_hours: Option<&Value>) -> Value {
    let mut raw = match detail.raw {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("raw".to_owned(), other);
            map
        }
    };

    if let (true, Some(photos)) = (wants_photos, detail.photos) {
        match raw.get_mut("photos") {
            Some(Value::Array(entries)) if entries.len() == photos.len() => {
                for (entry, photo) in entries.iter_mut().zip(photos) {
                    if let Value::Object(entry) = entry {
                        entry.insert("url".to_owned(), Value::String(photo.url));
                    }
                }
            }
            _ => {
                let entries = photos
                    .into_iter()
                    .map(|p| serde_json::json!({ "url": p.url }))
                    .collect();
                raw.insert("photos".to_owned(), Value::Array(entries));
            }
        }
    }

    if let Some(hours) = opening_hours {
        raw.insert("regularOpeningHours".to_owned(), hours.clone());
    }

    Value::Object(raw)
}
