//! Core domain types for the location field.
//!
//! Holds the data model shared by the provider and controller crates, the
//! codec for the persisted location value, and process configuration loaded
//! from the environment. Nothing in this crate touches the network.

pub mod app_config;
pub mod codec;
pub mod config;
pub mod error;
pub mod location;
pub mod types;

pub use app_config::AppConfig;
pub use codec::{decode, decode_or_empty, encode, try_decode, RawValue, NULL_SENTINEL};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, DecodeError, UnknownAxis};
pub use location::{CustomLocation, LocationValue, ResolvedLocation, CUSTOM_LOCATION_ID};
pub use types::{Axis, Candidate, Configuration, Coordinates, PlaceDetail, Photo, GEOMETRY_FIELD};
