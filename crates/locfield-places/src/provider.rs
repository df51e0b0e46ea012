//! Contract between the field and a places provider.
//!
//! A [`PlacesLoader`] turns a provider key into a ready [`PlacesSession`]; the
//! session answers prediction, detail and opening-hours queries. The Google
//! implementation lives in [`crate::google`]; tests substitute in-process fakes.

use std::fmt;
use std::future::Future;

use locfield_core::{Candidate, PlaceDetail};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::PlacesError;

/// Status string reported by the provider for a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderStatus {
    Ok,
    ZeroResults,
    OverQueryLimit,
    RequestDenied,
    InvalidRequest,
    NotFound,
    UnknownError,
    Other(String),
}

impl ProviderStatus {
    #[must_use]
    pub fn from_wire(status: &str) -> Self {
        match status {
            "OK" => ProviderStatus::Ok,
            "ZERO_RESULTS" => ProviderStatus::ZeroResults,
            "OVER_QUERY_LIMIT" => ProviderStatus::OverQueryLimit,
            "REQUEST_DENIED" => ProviderStatus::RequestDenied,
            "INVALID_REQUEST" => ProviderStatus::InvalidRequest,
            "NOT_FOUND" => ProviderStatus::NotFound,
            "UNKNOWN_ERROR" => ProviderStatus::UnknownError,
            other => ProviderStatus::Other(other.to_owned()),
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, ProviderStatus::Ok)
    }
}

impl fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProviderStatus::Ok => "OK",
            ProviderStatus::ZeroResults => "ZERO_RESULTS",
            ProviderStatus::OverQueryLimit => "OVER_QUERY_LIMIT",
            ProviderStatus::RequestDenied => "REQUEST_DENIED",
            ProviderStatus::InvalidRequest => "INVALID_REQUEST",
            ProviderStatus::NotFound => "NOT_FOUND",
            ProviderStatus::UnknownError => "UNKNOWN_ERROR",
            ProviderStatus::Other(other) => other,
        };
        f.write_str(s)
    }
}

/// A single prediction query.
#[derive(Debug, Clone, PartialEq)]
pub struct AutocompleteRequest {
    /// Literal text typed by the user.
    pub input: String,
    /// Configured autocomplete options, minus `input` and `sessionToken`.
    pub options: Map<String, Value>,
    /// Groups the query with its eventual detail request for billing.
    pub session_token: Uuid,
}

/// Initializes provider sessions for a key.
pub trait PlacesLoader: Send + Sync {
    type Session: PlacesSession;

    fn load(
        &self,
        api_key: &str,
    ) -> impl Future<Output = Result<Self::Session, PlacesError>> + Send;
}

/// An initialized provider handle.
///
/// Non-`OK` provider answers surface as [`PlacesError::Status`].
pub trait PlacesSession: Send + Sync + 'static {
    fn predictions(
        &self,
        request: &AutocompleteRequest,
    ) -> impl Future<Output = Result<Vec<Candidate>, PlacesError>> + Send;

    fn details(
        &self,
        place_id: &str,
        fields: &[String],
    ) -> impl Future<Output = Result<PlaceDetail, PlacesError>> + Send;

    /// Supplementary opening-hours lookup. `Ok(None)` means the provider
    /// answered but has no hours for the place.
    fn opening_hours(
        &self,
        place_id: &str,
    ) -> impl Future<Output = Result<Option<Value>, PlacesError>> + Send;
}
