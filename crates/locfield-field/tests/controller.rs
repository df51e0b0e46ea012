//! End-to-end tests for the location field against a mocked config endpoint
//! and a scripted places provider.

mod support;

use std::sync::Arc;
use std::time::Duration;

use locfield_core::{Axis, CustomLocation, LocationValue};
use locfield_field::{
    ChangeEvent, ConfigFetchError, ConfigLoader, FieldError, FieldPhase, FieldProps,
    LocationField, MountOutcome, OptionKind,
};
use locfield_places::PlacesError;
use serde_json::json;
use support::{candidate, detail, Script, ScriptedLoader};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::sync::Notify;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn config_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/location-field/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "googleMapsApiKey": "test-key",
            "fields": ["photo"],
            "autocompletionRequestOptions": { "types": ["address"] }
        })))
        .mount(&server)
        .await;
    server
}

fn field_with(
    server: &MockServer,
    script: &Arc<Script>,
    props: FieldProps,
) -> (LocationField<ScriptedLoader>, UnboundedReceiver<ChangeEvent>) {
    let (tx, rx) = unbounded_channel();
    let config_loader =
        ConfigLoader::new(&server.uri(), 5, "locfield-test/0.1").expect("valid admin url");
    let field = LocationField::new(props, config_loader, ScriptedLoader(Arc::clone(script)), tx);
    (field, rx)
}

async fn mounted(script: Script) -> (
    LocationField<ScriptedLoader>,
    UnboundedReceiver<ChangeEvent>,
    Arc<Script>,
    MockServer,
) {
    let server = config_server().await;
    let script = Arc::new(script);
    let (field, rx) = field_with(&server, &script, FieldProps::new("location"));
    assert_eq!(field.mount().await.expect("mount"), MountOutcome::Ready);
    (field, rx, script, server)
}

fn next_value(rx: &mut UnboundedReceiver<ChangeEvent>) -> LocationValue {
    let event = rx.try_recv().expect("a change event should have been emitted");
    assert_eq!(event.target.name, "location");
    assert_eq!(event.target.kind, "json");
    event.location().expect("emitted value should decode")
}

fn main_street() -> Script {
    Script::default()
        .with_predictions("123 Main", vec![candidate("abc", "123 Main St")])
        .with_detail(detail("abc", 43.1, -79.2))
}

#[tokio::test]
async fn scenario_a_selecting_a_candidate_resolves_it() {
    let (field, mut rx, script, _server) = mounted(main_street()).await;

    field.on_text_change("123 Main").await.unwrap();
    assert_eq!(field.phase().await, FieldPhase::PredictionsReady);
    assert!(rx.try_recv().is_err(), "typing alone must not change the value");

    field.on_select(Some("abc")).await.unwrap();

    let LocationValue::Resolved(r) = next_value(&mut rx) else {
        panic!("expected a resolved value");
    };
    assert_eq!(r.description, "123 Main St");
    assert_eq!(r.place_id, "abc");
    assert!((r.lat - 43.1).abs() < f64::EPSILON);
    assert!((r.lng + 79.2).abs() < f64::EPSILON);
    assert_eq!(field.display_text().await, "123 Main St");
    assert_eq!(field.phase().await, FieldPhase::Resolved);

    let detail_requests = script.detail_requests.lock().unwrap();
    assert_eq!(detail_requests.len(), 1);
    assert_eq!(detail_requests[0].1, vec!["photo", "geometry"]);
}

#[tokio::test]
async fn scenario_b_unknown_selection_becomes_custom() {
    let (field, mut rx, script, _server) = mounted(Script::default()).await;

    field.on_text_change("My Cottage").await.unwrap();
    field.on_select(Some("My Cottage")).await.unwrap();

    assert_eq!(
        next_value(&mut rx),
        LocationValue::Custom(CustomLocation::new("My Cottage"))
    );
    assert_eq!(field.display_text().await, "My Cottage");
    assert!(field.shows_coordinate_inputs().await);
    assert!(script.detail_requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn scenario_c_coordinate_edit_patches_the_custom_value() {
    let (field, mut rx, _script, _server) = mounted(Script::default()).await;
    field.on_select(Some("My Cottage")).await.unwrap();
    next_value(&mut rx);

    field.on_coordinate_edit(Some(43.5), Axis::Lat).await;

    assert_eq!(
        next_value(&mut rx),
        LocationValue::Custom(CustomLocation {
            description: "My Cottage".to_owned(),
            lat: Some(43.5),
            lng: None,
        })
    );
}

#[tokio::test]
async fn scenario_d_clear_reports_null_from_any_state() {
    let (field, mut rx, _script, _server) = mounted(main_street()).await;
    field.on_text_change("123 Main").await.unwrap();
    field.on_select(Some("abc")).await.unwrap();
    next_value(&mut rx);

    field.on_clear().await;

    let event = rx.try_recv().unwrap();
    assert!(event.is_null());
    assert_eq!(field.display_text().await, "");
    assert_eq!(field.value().await, LocationValue::Empty);
    assert_eq!(field.phase().await, FieldPhase::Idle);
}

#[tokio::test]
async fn empty_text_clears_candidates_and_value() {
    let (field, mut rx, script, _server) = mounted(main_street()).await;
    field.on_text_change("123 Main").await.unwrap();
    field.on_select(Some("abc")).await.unwrap();
    next_value(&mut rx);

    field.on_text_change("").await.unwrap();

    assert_eq!(next_value(&mut rx), LocationValue::Empty);
    assert!(field.candidates().await.is_empty());
    assert_eq!(field.value().await, LocationValue::Empty);
    assert_eq!(script.requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn selection_not_in_the_candidate_list_is_always_custom() {
    let (field, mut rx, _script, _server) = mounted(main_street()).await;
    field.on_text_change("123 Main").await.unwrap();

    field.on_select(Some("def")).await.unwrap();

    assert_eq!(
        next_value(&mut rx),
        LocationValue::Custom(CustomLocation::new("def"))
    );
}

#[tokio::test]
async fn coordinate_edit_changes_only_the_named_axis() {
    let (field, mut rx, _script, _server) = mounted(main_street()).await;
    field.on_text_change("123 Main").await.unwrap();
    field.on_select(Some("abc")).await.unwrap();
    let LocationValue::Resolved(before) = next_value(&mut rx) else {
        panic!("expected a resolved value");
    };

    field.on_coordinate_edit(Some(44.0), Axis::Lat).await;

    let LocationValue::Resolved(after) = next_value(&mut rx) else {
        panic!("coordinate edit must keep the variant");
    };
    assert!((after.lat - 44.0).abs() < f64::EPSILON);
    assert!((after.lng - before.lng).abs() < f64::EPSILON);
    assert_eq!(after.place_id, before.place_id);
    assert_eq!(after.description, before.description);
    assert_eq!(after.details, before.details);
}

#[tokio::test]
async fn coordinate_edit_on_an_empty_field_starts_a_custom_location() {
    let (field, mut rx, _script, _server) = mounted(Script::default()).await;

    field.on_coordinate_edit(Some(-79.2), Axis::Lng).await;

    assert_eq!(
        next_value(&mut rx),
        LocationValue::Custom(CustomLocation {
            description: String::new(),
            lat: None,
            lng: Some(-79.2),
        })
    );
}

#[tokio::test]
async fn non_finite_coordinate_edit_keeps_the_resolved_value() {
    let server = config_server().await;
    let script = Arc::new(Script::default());
    let wire = r#"{"description":"123 Main St","place_id":"abc","lat":43.1,"lng":-79.2}"#;
    let (field, mut rx) = field_with(
        &server,
        &script,
        FieldProps::new("location").with_value(wire),
    );
    assert_eq!(field.mount().await.expect("mount"), MountOutcome::Ready);
    let before = field.value().await;
    assert!(matches!(before, LocationValue::Resolved(_)));

    field.on_coordinate_edit(Some(f64::INFINITY), Axis::Lat).await;
    assert_eq!(next_value(&mut rx), before);

    field.on_coordinate_edit(Some(f64::NAN), Axis::Lng).await;
    assert_eq!(next_value(&mut rx), before);
    assert_eq!(field.value().await, before);
}

#[tokio::test]
async fn non_finite_coordinate_edit_keeps_the_custom_axis() {
    let (field, mut rx, _script, _server) = mounted(Script::default()).await;
    field.on_select(Some("My Cottage")).await.unwrap();
    next_value(&mut rx);
    field.on_coordinate_edit(Some(43.5), Axis::Lat).await;
    next_value(&mut rx);

    field.on_coordinate_edit(Some(f64::NEG_INFINITY), Axis::Lat).await;

    assert_eq!(
        next_value(&mut rx),
        LocationValue::Custom(CustomLocation {
            description: "My Cottage".to_owned(),
            lat: Some(43.5),
            lng: None,
        })
    );
}

#[tokio::test]
async fn repeated_clear_is_idempotent() {
    let (field, mut rx, _script, _server) = mounted(Script::default()).await;
    field.on_select(Some("My Cottage")).await.unwrap();
    next_value(&mut rx);

    field.on_clear().await;
    field.on_clear().await;

    let first = rx.try_recv().unwrap();
    let second = rx.try_recv().unwrap();
    assert_eq!(first, second);
    assert!(first.is_null());
    assert_eq!(field.value().await, LocationValue::Empty);
}

#[tokio::test]
async fn superseded_search_response_is_discarded() {
    let gate = Arc::new(Notify::new());
    let script = Script::default()
        .with_predictions("12", vec![candidate("old", "12 Old Rd")])
        .with_predictions("123", vec![candidate("new", "123 New St")])
        .with_gate("12", Arc::clone(&gate));
    let (field, _rx, _script, _server) = mounted(script).await;

    let fast_then_release = async {
        field.on_text_change("123").await.unwrap();
        gate.notify_one();
    };
    let (slow, ()) = tokio::join!(field.on_text_change("12"), fast_then_release);
    slow.unwrap();

    let ids: Vec<String> = field.candidates().await.into_iter().map(|c| c.id).collect();
    assert_eq!(ids, vec!["new"]);
    assert_eq!(field.display_text().await, "123");
}

#[tokio::test]
async fn clearing_text_discards_a_search_still_in_flight() {
    let gate = Arc::new(Notify::new());
    let script = Script::default()
        .with_predictions("12", vec![candidate("old", "12 Old Rd")])
        .with_gate("12", Arc::clone(&gate));
    let (field, _rx, _script, _server) = mounted(script).await;

    let clear_then_release = async {
        field.on_text_change("").await.unwrap();
        gate.notify_one();
    };
    let (slow, ()) = tokio::join!(field.on_text_change("12"), clear_then_release);
    slow.unwrap();

    assert!(field.candidates().await.is_empty());
}

#[tokio::test]
async fn custom_selection_discards_a_search_still_in_flight() {
    let gate = Arc::new(Notify::new());
    let script = Script::default()
        .with_predictions("My", vec![candidate("rd", "My Cottage Rd")])
        .with_gate("My", Arc::clone(&gate));
    let (field, mut rx, _script, _server) = mounted(script).await;

    let choose_then_release = async {
        field.on_select(Some("My Cottage")).await.unwrap();
        gate.notify_one();
    };
    let (slow, ()) = tokio::join!(field.on_text_change("My"), choose_then_release);
    slow.unwrap();

    assert_eq!(
        next_value(&mut rx),
        LocationValue::Custom(CustomLocation::new("My Cottage"))
    );
    assert_eq!(field.phase().await, FieldPhase::Custom);
    assert!(field.candidates().await.is_empty());
    assert_eq!(field.display_text().await, "My Cottage");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_text_changes_settle_on_the_last_written_text() {
    let queries: Vec<String> = (0..16).map(|i| format!("{i} Main")).collect();
    let script = queries.iter().fold(Script::default(), |script, query| {
        script.with_predictions(query, vec![candidate(query, query)])
    });
    let (field, _rx, _script, _server) = mounted(script).await;
    let field = Arc::new(field);

    let mut tasks = tokio::task::JoinSet::new();
    for query in queries {
        let field = Arc::clone(&field);
        tasks.spawn(async move { field.on_text_change(&query).await });
    }
    while let Some(result) = tasks.join_next().await {
        result.expect("task should not panic").unwrap();
    }

    let text = field.display_text().await;
    let ids: Vec<String> = field.candidates().await.into_iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![text]);
    assert_eq!(field.phase().await, FieldPhase::PredictionsReady);
}

#[tokio::test]
async fn failed_detail_lookup_keeps_the_previous_value() {
    let script = Script::default().with_predictions("123 Main", vec![candidate("abc", "123 Main St")]);
    let (field, mut rx, _script, _server) = mounted(script).await;
    field.on_select(Some("My Cottage")).await.unwrap();
    let previous = next_value(&mut rx);

    field.on_text_change("123 Main").await.unwrap();
    field.on_select(Some("abc")).await.unwrap();

    assert!(rx.try_recv().is_err(), "no event on a failed resolution");
    assert_eq!(field.value().await, previous);
    assert_eq!(field.phase().await, FieldPhase::PredictionsReady);
}

#[tokio::test]
async fn search_passes_configured_options() {
    let (field, _rx, script, _server) = mounted(main_street()).await;

    field.on_text_change("123 Main").await.unwrap();

    let requests = script.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].input, "123 Main");
    assert_eq!(requests[0].options.get("types"), Some(&json!(["address"])));
}

#[tokio::test]
async fn disabled_field_ignores_interactions() {
    let server = config_server().await;
    let script = Arc::new(Script::default());
    let (field, mut rx) = field_with(
        &server,
        &script,
        FieldProps::new("location").disabled(true),
    );
    field.mount().await.unwrap();

    field.on_select(Some("My Cottage")).await.unwrap();
    field.on_coordinate_edit(Some(1.0), Axis::Lat).await;
    field.on_clear().await;

    assert!(rx.try_recv().is_err());
    assert_eq!(field.value().await, LocationValue::Empty);
}

#[tokio::test]
async fn provider_load_failure_is_surfaced_and_not_retried() {
    let server = config_server().await;
    let script = Arc::new(Script {
        fail_load: true,
        ..Script::default()
    });
    let (field, _rx) = field_with(&server, &script, FieldProps::new("location"));

    let mounted = field.mount().await;
    assert!(matches!(
        mounted,
        Err(FieldError::ProviderLoad(PlacesError::ProviderLoad(_)))
    ));

    let searched = field.on_text_change("123 Main").await;
    assert!(matches!(searched, Err(FieldError::ProviderLoad(_))));
    assert_eq!(field.phase().await, FieldPhase::Idle);
    assert_eq!(script.loads(), 1);
}

#[tokio::test]
async fn config_failure_leaves_the_field_inert() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/location-field/config"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let script = Arc::new(Script::default());
    let (field, _rx) = field_with(&server, &script, FieldProps::new("location"));

    let mounted = field.mount().await;
    assert!(matches!(
        mounted,
        Err(FieldError::ConfigFetch(ConfigFetchError::UnexpectedStatus { status: 500, .. }))
    ));
    assert!(matches!(
        field.on_text_change("123 Main").await,
        Err(FieldError::NotReady)
    ));
    assert_eq!(script.loads(), 0);
}

#[tokio::test]
async fn unmount_abandons_the_configuration_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/location-field/config"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "googleMapsApiKey": "test-key" }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;
    let script = Arc::new(Script::default());
    let (field, _rx) = field_with(&server, &script, FieldProps::new("location"));

    let unmount_soon = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        field.unmount();
    };
    let (outcome, ()) = tokio::join!(field.mount(), unmount_soon);

    assert_eq!(outcome.unwrap(), MountOutcome::Abandoned);
    assert!(field.configuration().await.is_none());
    assert_eq!(script.loads(), 0);
}

#[tokio::test]
async fn configuration_is_fetched_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/location-field/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "googleMapsApiKey": "test-key",
            "fields": ["geometry", "photo"]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let script = Arc::new(Script::default());
    let (field, _rx) = field_with(&server, &script, FieldProps::new("location"));

    assert_eq!(field.mount().await.unwrap(), MountOutcome::Ready);
    assert_eq!(field.mount().await.unwrap(), MountOutcome::Ready);

    let configuration = field.configuration().await.unwrap();
    assert_eq!(configuration.detail_fields, vec!["geometry", "photo"]);
    assert_eq!(script.loads(), 1);
}

#[tokio::test]
async fn initial_and_host_set_values_are_decoded() {
    let server = config_server().await;
    let script = Arc::new(Script::default());
    let wire = r#"{"description":"My Cottage","place_id":"custom_location","lat":43.5,"lng":null}"#;
    let (field, mut rx) = field_with(
        &server,
        &script,
        FieldProps::new("location").with_value(wire),
    );

    assert_eq!(field.display_text().await, "My Cottage");
    assert_eq!(field.phase().await, FieldPhase::Custom);

    field.set_value("null").await;
    assert_eq!(field.value().await, LocationValue::Empty);
    assert_eq!(field.display_text().await, "");
    assert_eq!(field.encoded_value().await, "null");
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn options_list_candidates_then_placeholders() {
    let (field, _rx, _script, _server) = mounted(main_street()).await;
    field.on_text_change("123 Main").await.unwrap();

    let kinds: Vec<OptionKind> = field.options().await.into_iter().map(|o| o.kind).collect();
    assert_eq!(
        kinds,
        vec![OptionKind::Candidate, OptionKind::CustomLocation, OptionKind::Current]
    );
    assert_eq!(
        LocationField::<ScriptedLoader>::create_message("Barn"),
        "Create Location: \"Barn\""
    );
}
