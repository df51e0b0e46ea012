use thiserror::Error;

use crate::types::Axis;

/// Errors raised while reading process configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Errors raised while decoding a persisted location value.
///
/// Callers at the field boundary never see these: [`crate::decode`] logs them
/// and degrades to "no value".
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("location value is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("location value must be a JSON object, got {kind}")]
    NotAnObject { kind: &'static str },

    #[error("resolved location {place_id} has no numeric {axis}")]
    MissingCoordinate { place_id: String, axis: Axis },
}

/// Returned when parsing an [`Axis`] from anything other than `lat` or `lng`.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown coordinate axis \"{0}\" (expected \"lat\" or \"lng\")")]
pub struct UnknownAxis(pub String);
