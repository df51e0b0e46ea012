use locfield_places::PlacesError;
use thiserror::Error;

/// Failures fetching the field configuration from the host.
#[derive(Debug, Error)]
pub enum ConfigFetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for location field config: {0}")]
    Deserialize(#[source] serde_json::Error),

    #[error("invalid admin URL: {0}")]
    InvalidBaseUrl(String),
}

/// Failures that leave the field unusable and are reported to the host.
///
/// Failures of a single search or selection never show up here; they are
/// logged and the previous state is kept.
#[derive(Debug, Error)]
pub enum FieldError {
    #[error("location field configuration unavailable: {0}")]
    ConfigFetch(#[from] ConfigFetchError),

    #[error("places provider unavailable: {0}")]
    ProviderLoad(#[from] PlacesError),

    #[error("location field is not configured yet")]
    NotReady,
}
