//! Prediction search with stale-response detection.
//!
//! Every search is issued a [`SearchTicket`] from a monotonically increasing
//! counter. Several searches may be in flight at once; only the response
//! holding the most recently issued ticket may replace the candidate list.

use std::sync::atomic::{AtomicU64, Ordering};

use locfield_core::Candidate;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::PlacesError;
use crate::provider::{AutocompleteRequest, PlacesSession};

/// Option keys owned by the search itself; configured values are dropped.
const RESERVED_OPTION_KEYS: [&str; 2] = ["input", "sessionToken"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket(u64);

#[derive(Debug, Default)]
pub struct PredictionSearch {
    latest: AtomicU64,
}

impl PredictionSearch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a ticket for a new search, superseding every earlier one.
    pub fn issue(&self) -> SearchTicket {
        SearchTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Supersedes every outstanding ticket without starting a search.
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_latest(&self, ticket: SearchTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Queries the provider for candidates matching `query`.
    ///
    /// An empty query returns no candidates without touching the provider.
    /// Provider failures are logged and also yield no candidates.
    pub async fn search<S: PlacesSession>(
        &self,
        session: &S,
        query: &str,
        options: &Map<String, Value>,
    ) -> Vec<Candidate> {
        if query.is_empty() {
            return Vec::new();
        }

        let mut options = options.clone();
        for key in RESERVED_OPTION_KEYS {
            options.remove(key);
        }
        let request = AutocompleteRequest {
            input: query.to_owned(),
            options,
            session_token: Uuid::new_v4(),
        };

        match session.predictions(&request).await {
            Ok(candidates) => {
                tracing::debug!(count = candidates.len(), "prediction query answered");
                candidates
            }
            Err(PlacesError::Status {
                status, message, ..
            }) => {
                tracing::warn!(%status, message = ?message, "prediction query returned non-OK status");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "prediction query failed");
                Vec::new()
            }
        }
    }
}
