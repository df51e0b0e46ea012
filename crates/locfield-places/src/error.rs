use thiserror::Error;

use crate::provider::ProviderStatus;

/// Errors returned by the places provider and its client.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The provider answered with a non-`OK` status.
    #[error("places {operation} returned {status}{}", message_suffix(.message))]
    Status {
        operation: &'static str,
        status: ProviderStatus,
        message: Option<String>,
    },

    /// The provider handle could not be initialized for a key.
    #[error("places provider failed to load: {0}")]
    ProviderLoad(String),

    /// A detail response carried no usable `geometry.location`.
    #[error("place {place_id} has no geometry")]
    MissingGeometry { place_id: String },

    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

#[allow(clippy::ref_option)]
fn message_suffix(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}
