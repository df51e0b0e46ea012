//! Option list offered by the field's combobox.

use locfield_core::{Candidate, LocationValue, CUSTOM_LOCATION_ID};
use serde::Serialize;

const CUSTOM_LOCATION_LABEL: &str = "Custom Location";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    /// A provider prediction; selecting it resolves the place.
    Candidate,
    /// Placeholder naming the current custom location, if any.
    CustomLocation,
    /// Mirrors the persisted value so the combobox can display it.
    Current,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComboboxOption {
    pub value: String,
    pub label: String,
    pub kind: OptionKind,
}

/// Candidates first, then the custom-location entry, then the current value.
#[must_use]
pub fn build_options(candidates: &[Candidate], current: &LocationValue) -> Vec<ComboboxOption> {
    let mut options: Vec<ComboboxOption> = candidates
        .iter()
        .map(|c| ComboboxOption {
            value: c.id.clone(),
            label: c.description.clone(),
            kind: OptionKind::Candidate,
        })
        .collect();

    let custom_label = match current {
        LocationValue::Custom(c) => c.description.clone(),
        _ => CUSTOM_LOCATION_LABEL.to_owned(),
    };
    options.push(ComboboxOption {
        value: CUSTOM_LOCATION_ID.to_owned(),
        label: custom_label,
        kind: OptionKind::CustomLocation,
    });

    options.push(ComboboxOption {
        value: current.id().unwrap_or_default().to_owned(),
        label: current.description().unwrap_or_default().to_owned(),
        kind: OptionKind::Current,
    });

    options
}

/// Prompt shown for creating a custom location from typed text.
#[must_use]
pub fn create_message(text: &str) -> String {
    format!("Create Location: \"{text}\"")
}
