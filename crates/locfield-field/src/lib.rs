//! Location form field for a headless CMS admin.
//!
//! [`LocationField`] loads its configuration from the host with
//! [`ConfigLoader`], searches and resolves places through a
//! [`locfield_places::PlacesLoader`], and reports every value change to the
//! host form as a [`ChangeEvent`].

pub mod config_loader;
pub mod controller;
pub mod error;
pub mod options;
pub mod props;

pub use config_loader::ConfigLoader;
pub use controller::{FieldPhase, LocationField, MountOutcome};
pub use error::{ConfigFetchError, FieldError};
pub use options::{build_options, create_message, ComboboxOption, OptionKind};
pub use props::{ChangeEvent, ChangeTarget, FieldProps, DEFAULT_ATTRIBUTE_TYPE};
