//! Google Maps Places implementation of the provider contract.
//!
//! Predictions and details use the Places web service
//! (`/maps/api/place/{autocomplete,details}/json`); opening hours come from
//! the Places API (New) `GET /v1/places/{id}` with a field mask. The API key
//! is sent as a query parameter or header and is stripped from every error.

mod params;
mod types;

use std::time::Duration;

use locfield_core::{Candidate, Coordinates, PlaceDetail, Photo};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::PlacesError;
use crate::provider::{AutocompleteRequest, PlacesLoader, PlacesSession, ProviderStatus};
use types::{AutocompleteResponse, DetailsResponse, PlaceV1Response};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";
const DEFAULT_V1_BASE_URL: &str = "https://places.googleapis.com";
const DEFAULT_PHOTO_MAX_WIDTH: u32 = 800;

const AUTOCOMPLETE_PATH: &str = "maps/api/place/autocomplete/json";
const DETAILS_PATH: &str = "maps/api/place/details/json";
const PHOTO_PATH: &str = "maps/api/place/photo";
const V1_PLACES_PATH: &str = "v1/places/";
const OPENING_HOURS_FIELD_MASK: &str = "displayName,regularOpeningHours";

/// Builds [`GooglePlacesClient`] sessions.
///
/// Use [`GoogleMapsLoader::new`] for production endpoints or
/// [`GoogleMapsLoader::with_base_urls`] to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct GoogleMapsLoader {
    timeout_secs: u64,
    user_agent: String,
    base_url: String,
    v1_base_url: String,
    photo_max_width: u32,
}

impl GoogleMapsLoader {
    #[must_use]
    pub fn new(timeout_secs: u64, user_agent: &str) -> Self {
        Self {
            timeout_secs,
            user_agent: user_agent.to_owned(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            v1_base_url: DEFAULT_V1_BASE_URL.to_owned(),
            photo_max_width: DEFAULT_PHOTO_MAX_WIDTH,
        }
    }

    #[must_use]
    pub fn with_base_urls(mut self, base_url: &str, v1_base_url: &str) -> Self {
        base_url.clone_into(&mut self.base_url);
        v1_base_url.clone_into(&mut self.v1_base_url);
        self
    }

    #[must_use]
    pub fn with_photo_max_width(mut self, photo_max_width: u32) -> Self {
        self.photo_max_width = photo_max_width;
        self
    }
}

impl PlacesLoader for GoogleMapsLoader {
    type Session = GooglePlacesClient;

    async fn load(&self, api_key: &str) -> Result<GooglePlacesClient, PlacesError> {
        if api_key.trim().is_empty() {
            return Err(PlacesError::ProviderLoad(
                "no Google Maps API key configured".to_owned(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&self.user_agent)
            .build()
            .map_err(|e| PlacesError::ProviderLoad(e.to_string()))?;

        Ok(GooglePlacesClient {
            client,
            api_key: api_key.to_owned(),
            base_url: parse_base_url(&self.base_url)?,
            v1_base_url: parse_base_url(&self.v1_base_url)?,
            photo_max_width: self.photo_max_width,
        })
    }
}

/// An initialized Google Places session bound to one API key.
pub struct GooglePlacesClient {
    client: Client,
    api_key: String,
    base_url: Url,
    v1_base_url: Url,
    photo_max_width: u32,
}

impl GooglePlacesClient {
    fn endpoint(base: &Url, path: &str) -> Result<Url, PlacesError> {
        base.join(path)
            .map_err(|e| PlacesError::InvalidBaseUrl(format!("{base}{path}: {e}")))
    }

    /// Photo endpoint URL for a photo reference, as the browser SDK's
    /// `photo.getUrl()` would produce.
    fn photo_url(&self, photo_reference: &str) -> Result<Url, PlacesError> {
        let mut url = Self::endpoint(&self.base_url, PHOTO_PATH)?;
        url.query_pairs_mut()
            .append_pair("maxwidth", &self.photo_max_width.to_string())
            .append_pair("photo_reference", photo_reference)
            .append_pair("key", &self.api_key);
        Ok(url)
    }

    /// Sends a request, asserts a 2xx status, and parses the JSON body.
    ///
    /// The request URL (which carries the key) is removed from HTTP errors.
    async fn send_json<T: DeserializeOwned>(
        request: RequestBuilder,
        context: &str,
    ) -> Result<T, PlacesError> {
        let response = request.send().await.map_err(|e| e.without_url())?;
        let response = response.error_for_status().map_err(|e| e.without_url())?;
        let body = response.text().await.map_err(|e| e.without_url())?;
        serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }

    fn photos(&self, result: &Value) -> Option<Vec<Photo>> {
        let entries = result.get("photos")?.as_array()?;
        let photos = entries
            .iter()
            .filter_map(|entry| entry.get("photo_reference").and_then(Value::as_str))
            .filter_map(|reference| match self.photo_url(reference) {
                Ok(url) => Some(Photo {
                    url: url.to_string(),
                }),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping photo with unbuildable URL");
                    None
                }
            })
            .collect();
        Some(photos)
    }
}

impl PlacesSession for GooglePlacesClient {
    async fn predictions(
        &self,
        request: &AutocompleteRequest,
    ) -> Result<Vec<Candidate>, PlacesError> {
        let mut url = Self::endpoint(&self.base_url, AUTOCOMPLETE_PATH)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("input", &request.input);
            pairs.append_pair("sessiontoken", &request.session_token.to_string());
            for (key, value) in params::autocomplete_params(&request.options) {
                pairs.append_pair(&key, &value);
            }
            pairs.append_pair("key", &self.api_key);
        }

        let response: AutocompleteResponse =
            Self::send_json(self.client.get(url), "autocomplete").await?;
        check_status("autocomplete", &response.status, response.error_message)?;

        Ok(response
            .predictions
            .into_iter()
            .filter_map(|raw| {
                let id = raw.get("place_id").and_then(Value::as_str)?.to_owned();
                let description = raw.get("description").and_then(Value::as_str)?.to_owned();
                Some(Candidate {
                    id,
                    description,
                    raw,
                })
            })
            .collect())
    }

    async fn details(&self, place_id: &str, fields: &[String]) -> Result<PlaceDetail, PlacesError> {
        let mut url = Self::endpoint(&self.base_url, DETAILS_PATH)?;
        url.query_pairs_mut()
            .append_pair("place_id", place_id)
            .append_pair("fields", &fields.join(","))
            .append_pair("key", &self.api_key);

        let response: DetailsResponse = Self::send_json(self.client.get(url), "details").await?;
        check_status("details", &response.status, response.error_message)?;

        let missing_geometry = || PlacesError::MissingGeometry {
            place_id: place_id.to_owned(),
        };
        let result = response.result.ok_or_else(missing_geometry)?;
        let lat = result
            .pointer("/geometry/location/lat")
            .and_then(Value::as_f64)
            .ok_or_else(missing_geometry)?;
        let lng = result
            .pointer("/geometry/location/lng")
            .and_then(Value::as_f64)
            .ok_or_else(missing_geometry)?;

        Ok(PlaceDetail {
            id: place_id.to_owned(),
            coordinates: Coordinates { lat, lng },
            photos: self.photos(&result),
            opening_hours: result.get("opening_hours").cloned(),
            raw: result,
        })
    }

    async fn opening_hours(&self, place_id: &str) -> Result<Option<Value>, PlacesError> {
        let mut url = Self::endpoint(&self.v1_base_url, V1_PLACES_PATH)?;
        url.path_segments_mut()
            .map_err(|()| PlacesError::InvalidBaseUrl(self.v1_base_url.to_string()))?
            .pop_if_empty()
            .push(place_id);

        let request = self
            .client
            .get(url)
            .header("X-Goog-Api-Key", &self.api_key)
            .header("X-Goog-FieldMask", OPENING_HOURS_FIELD_MASK);
        let response: PlaceV1Response = Self::send_json(request, "opening hours").await?;
        Ok(response.regular_opening_hours)
    }
}

/// Normalises a base URL to end with exactly one slash so relative endpoint
/// paths join beneath it rather than replacing its last segment.
fn parse_base_url(base_url: &str) -> Result<Url, PlacesError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised)
        .map_err(|e| PlacesError::InvalidBaseUrl(format!("'{base_url}': {e}")))
}

fn check_status(
    operation: &'static str,
    status: &str,
    message: Option<String>,
) -> Result<(), PlacesError> {
    let status = ProviderStatus::from_wire(status);
    if status.is_ok() {
        return Ok(());
    }
    Err(PlacesError::Status {
        operation,
        status,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_base_url_appends_a_single_trailing_slash() {
        assert_eq!(
            parse_base_url("https://maps.googleapis.com").unwrap().as_str(),
            "https://maps.googleapis.com/"
        );
        assert_eq!(
            parse_base_url("http://127.0.0.1:9000/proxy//").unwrap().as_str(),
            "http://127.0.0.1:9000/proxy/"
        );
    }

    #[test]
    fn parse_base_url_rejects_garbage() {
        assert!(matches!(
            parse_base_url("not a url"),
            Err(PlacesError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn check_status_maps_non_ok_to_status_error() {
        assert!(check_status("details", "OK", None).is_ok());
        let err = check_status("details", "REQUEST_DENIED", Some("bad key".to_owned())).unwrap_err();
        assert_eq!(err.to_string(), "places details returned REQUEST_DENIED: bad key");
    }

    #[tokio::test]
    async fn load_rejects_an_empty_key() {
        let loader = GoogleMapsLoader::new(5, "locfield-test/0.1");
        let result = loader.load("  ").await;
        assert!(matches!(result, Err(PlacesError::ProviderLoad(_))));
    }

    #[tokio::test]
    async fn photo_url_carries_reference_width_and_key() {
        let loader = GoogleMapsLoader::new(5, "locfield-test/0.1").with_photo_max_width(400);
        let client = loader.load("test-key").await.unwrap();
        let url = client.photo_url("ref 1").unwrap();
        assert_eq!(
            url.as_str(),
            "https://maps.googleapis.com/maps/api/place/photo?maxwidth=400&photo_reference=ref+1&key=test-key"
        );
    }
}
