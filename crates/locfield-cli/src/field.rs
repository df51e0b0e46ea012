//! Command handlers that drive a [`LocationField`] against the configured
//! admin host and Google Maps Places.

use anyhow::Context;
use locfield_core::{encode, try_decode, AppConfig, Axis, LocationValue};
use locfield_field::{ChangeEvent, ConfigLoader, FieldProps, LocationField, MountOutcome};
use locfield_places::{GoogleMapsLoader, PlaceResolver};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

type Field = LocationField<GoogleMapsLoader>;

fn build_field(config: &AppConfig) -> anyhow::Result<(Field, UnboundedReceiver<ChangeEvent>)> {
    let config_loader = ConfigLoader::new(
        &config.admin_url,
        config.request_timeout_secs,
        &config.user_agent,
    )
    .context("failed to build configuration client")?
    .with_token(config.admin_token.clone());

    let loader = GoogleMapsLoader::new(config.request_timeout_secs, &config.user_agent)
        .with_base_urls(&config.places_base_url, &config.places_v1_base_url)
        .with_photo_max_width(config.photo_max_width);

    let (tx, rx) = unbounded_channel();
    let field = LocationField::new(
        FieldProps::new(config.field_name.clone()),
        config_loader,
        loader,
        tx,
    )
    .with_resolver(PlaceResolver::new(config.fetch_opening_hours));
    Ok((field, rx))
}

async fn mount(config: &AppConfig) -> anyhow::Result<(Field, UnboundedReceiver<ChangeEvent>)> {
    let (field, rx) = build_field(config)?;
    match field.mount().await? {
        MountOutcome::Ready => Ok((field, rx)),
        MountOutcome::Abandoned => anyhow::bail!("field was unmounted during startup"),
    }
}

fn print_value(value: &LocationValue, encoded: &str) {
    println!("{encoded}");
    if let Some(url) = value.maps_url() {
        println!("maps: {url}");
    }
}

/// Show the configuration the admin host serves for the field.
///
/// The provider key itself is never printed.
///
/// # Errors
///
/// Returns an error if the configuration cannot be fetched or the provider
/// fails to load with the served key.
pub(crate) async fn run_config(config: &AppConfig) -> anyhow::Result<()> {
    let (field, _rx) = mount(config).await?;
    let configuration = field
        .configuration()
        .await
        .context("configuration missing after mount")?;

    let summary = serde_json::json!({
        "hasKey": !configuration.provider_key.is_empty(),
        "fields": configuration.detail_fields,
        "autocompletionRequestOptions": configuration.autocomplete_options,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Print the predictions for `text`, one `PLACE ID  DESCRIPTION` row each.
///
/// # Errors
///
/// Returns an error if the field cannot be mounted.
pub(crate) async fn run_search(config: &AppConfig, text: &str) -> anyhow::Result<()> {
    let (field, _rx) = mount(config).await?;
    field.on_text_change(text).await?;

    let candidates = field.candidates().await;
    if candidates.is_empty() {
        println!("no predictions for \"{text}\"");
        return Ok(());
    }
    println!("{:<32}DESCRIPTION", "PLACE ID");
    for candidate in &candidates {
        println!("{:<32}{}", candidate.id, candidate.description);
    }
    Ok(())
}

/// Search for `text`, select `place_id` and print each change event as JSON.
///
/// # Errors
///
/// Returns an error if the field cannot be mounted.
pub(crate) async fn run_select(config: &AppConfig, text: &str, place_id: &str) -> anyhow::Result<()> {
    let (field, mut rx) = mount(config).await?;
    field.on_text_change(text).await?;
    field.on_select(Some(place_id)).await?;

    let mut emitted = false;
    while let Ok(event) = rx.try_recv() {
        println!("{}", serde_json::to_string(&event)?);
        emitted = true;
    }
    if !emitted {
        println!("\"{place_id}\" could not be resolved; value unchanged");
    } else if let Some(url) = field.value().await.maps_url() {
        println!("maps: {url}");
    }
    Ok(())
}

/// Builds a custom location with the given coordinates, the same value the
/// field holds after a custom selection followed by coordinate edits.
pub(crate) fn custom_value(description: &str, lat: Option<f64>, lng: Option<f64>) -> LocationValue {
    PlaceResolver::create_custom(description)
        .with_coordinate(Axis::Lat, lat)
        .with_coordinate(Axis::Lng, lng)
}

/// Declare a custom location and print its encoded value.
///
/// Runs offline; neither the admin host nor the provider is contacted.
pub(crate) fn run_custom(description: &str, lat: Option<f64>, lng: Option<f64>) {
    let value = custom_value(description, lat, lng);
    print_value(&value, &encode(&value));
}

/// Decode `raw` and describe the location it holds.
///
/// # Errors
///
/// Returns an error if `raw` is not a valid location value.
pub(crate) fn run_decode(raw: &str) -> anyhow::Result<()> {
    let value = try_decode(raw).context("not a valid location value")?;
    match &value {
        LocationValue::Empty => println!("empty"),
        LocationValue::Resolved(r) => {
            println!("resolved: {} ({})", r.description, r.place_id);
            println!("lat: {}, lng: {}", r.lat, r.lng);
        }
        LocationValue::Custom(c) => {
            println!("custom: {}", c.description);
            println!(
                "lat: {}, lng: {}",
                fmt_coordinate(c.lat),
                fmt_coordinate(c.lng)
            );
        }
    }
    if let Some(url) = value.maps_url() {
        println!("maps: {url}");
    }
    Ok(())
}

fn fmt_coordinate(coordinate: Option<f64>) -> String {
    coordinate.map_or_else(|| "unset".to_string(), |c| c.to_string())
}
