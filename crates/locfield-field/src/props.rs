//! Host form contract: the props a field is rendered with and the change
//! events it reports back.

use locfield_core::{decode, LocationValue, RawValue, NULL_SENTINEL};
use serde::Serialize;

/// Attribute type the location field registers with the host.
pub const DEFAULT_ATTRIBUTE_TYPE: &str = "json";

#[derive(Debug, Clone)]
pub struct FieldProps {
    pub name: String,
    /// Declared attribute type, echoed back in every change event.
    pub attribute_type: String,
    pub value: RawValue,
    pub disabled: bool,
    pub required: bool,
    pub error: Option<String>,
}

impl FieldProps {
    /// Props for an enabled, optional field currently holding no value.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attribute_type: DEFAULT_ATTRIBUTE_TYPE.to_owned(),
            value: RawValue::Text(NULL_SENTINEL.to_owned()),
            disabled: false,
            required: false,
            error: None,
        }
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<RawValue>) -> Self {
        self.value = value.into();
        self
    }

    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// Payload of the host's `onChange({ target: { name, value, type } })` callback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeEvent {
    pub target: ChangeTarget,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeTarget {
    pub name: String,
    /// Encoded location value; `"null"` when the field was cleared.
    pub value: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ChangeEvent {
    #[must_use]
    pub fn new(name: &str, value: String, kind: &str) -> Self {
        Self {
            target: ChangeTarget {
                name: name.to_owned(),
                value,
                kind: kind.to_owned(),
            },
        }
    }

    /// Decodes the carried value.
    #[must_use]
    pub fn location(&self) -> Option<LocationValue> {
        decode(&RawValue::Text(self.target.value.clone()))
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        self.target.value == NULL_SENTINEL
    }
}
