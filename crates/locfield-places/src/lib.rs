//! Places provider access for the location field.
//!
//! [`ProviderClient`] memoizes one provider session per key,
//! [`PredictionSearch`] turns typed text into candidates, and
//! [`PlaceResolver`] turns a chosen candidate into a resolved location value.
//! [`google`] implements the provider contract against Google Maps Places.

pub mod error;
pub mod google;
pub mod handle;
pub mod provider;
pub mod resolver;
pub mod search;

#[cfg(test)]
mod fake;

pub use error::PlacesError;
pub use google::{GoogleMapsLoader, GooglePlacesClient};
pub use handle::ProviderClient;
pub use provider::{AutocompleteRequest, PlacesLoader, PlacesSession, ProviderStatus};
pub use resolver::PlaceResolver;
pub use search::{PredictionSearch, SearchTicket};
