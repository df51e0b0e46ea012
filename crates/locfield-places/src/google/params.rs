//! Translation of JavaScript-SDK style autocomplete options into Places web
//! service query parameters.
//!
//! Hosts configure `autocompletionRequestOptions` the way the browser SDK
//! expects them, e.g.
//!
//! ```json
//! { "types": ["geocode"], "componentRestrictions": { "country": ["ca", "us"] },
//!   "location": { "lat": 43.08, "lng": -79.07 }, "radius": 5000, "strictBounds": true }
//! ```
//!
//! which becomes `types=geocode&components=country:ca|country:us&location=43.08,-79.07&radius=5000&strictbounds=true`.

use serde_json::{Map, Value};

/// Builds query parameters from configured autocomplete options.
///
/// Keys the web service cannot express (unknown nested objects) are skipped.
pub(crate) fn autocomplete_params(options: &Map<String, Value>) -> Vec<(String, String)> {
    let mut params = Vec::with_capacity(options.len());
    for (key, value) in options {
        match key.as_str() {
            "componentRestrictions" => {
                if let Some(components) = component_restrictions(value) {
                    params.push(("components".to_owned(), components));
                }
            }
            "strictBounds" => {
                if value.as_bool() == Some(true) {
                    params.push(("strictbounds".to_owned(), "true".to_owned()));
                }
            }
            _ => match param_value(value) {
                Some(rendered) => params.push((key.clone(), rendered)),
                None => {
                    tracing::debug!(option = %key, "skipping autocomplete option with no query form");
                }
            },
        }
    }
    params
}

fn component_restrictions(value: &Value) -> Option<String> {
    let countries: Vec<&str> = match value.get("country")? {
        Value::String(country) => vec![country.as_str()],
        Value::Array(countries) => countries.iter().filter_map(Value::as_str).collect(),
        _ => return None,
    };
    if countries.is_empty() {
        return None;
    }
    Some(
        countries
            .iter()
            .map(|c| format!("country:{}", c.to_ascii_lowercase()))
            .collect::<Vec<_>>()
            .join("|"),
    )
}

fn param_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let rendered: Vec<String> = items.iter().filter_map(param_value).collect();
            (!rendered.is_empty()).then(|| rendered.join("|"))
        }
        Value::Object(map) => {
            let lat = map.get("lat").and_then(Value::as_f64)?;
            let lng = map.get("lng").and_then(Value::as_f64)?;
            Some(format!("{lat},{lng}"))
        }
    }
}
