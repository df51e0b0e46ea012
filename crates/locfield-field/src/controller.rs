//! The location field itself: owns the current value, the display text and
//! the candidate list, and reports every value change to the host form.

use locfield_core::{
    decode_or_empty, encode, Axis, Candidate, Configuration, LocationValue, RawValue,
};
use locfield_places::{PlaceResolver, PlacesLoader, PredictionSearch, ProviderClient};
use tokio::sync::{mpsc::UnboundedSender, watch, Mutex};

use crate::config_loader::ConfigLoader;
use crate::error::FieldError;
use crate::options::{build_options, create_message, ComboboxOption};
use crate::props::{ChangeEvent, FieldProps};

/// Where the field is in its interaction cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPhase {
    Idle,
    Searching,
    PredictionsReady,
    Resolving,
    Resolved,
    Custom,
}

impl FieldPhase {
    fn settled(value: &LocationValue) -> Self {
        match value {
            LocationValue::Empty => FieldPhase::Idle,
            LocationValue::Resolved(_) => FieldPhase::Resolved,
            LocationValue::Custom(_) => FieldPhase::Custom,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountOutcome {
    /// Configuration is loaded and the field accepts searches.
    Ready,
    /// The field was unmounted before the configuration arrived.
    Abandoned,
}

#[derive(Debug)]
struct FieldState {
    configuration: Option<Configuration>,
    value: LocationValue,
    text: String,
    candidates: Vec<Candidate>,
    phase: FieldPhase,
}

pub struct LocationField<L: PlacesLoader> {
    props: FieldProps,
    config_loader: ConfigLoader,
    provider: ProviderClient<L>,
    search: PredictionSearch,
    resolver: PlaceResolver,
    state: Mutex<FieldState>,
    unmounted: watch::Sender<bool>,
    events: UnboundedSender<ChangeEvent>,
}

impl<L: PlacesLoader> LocationField<L> {
    /// Creates a field showing the value held in `props`.
    ///
    /// Change events are sent on `events`. The field is inert until
    /// [`LocationField::mount`] has loaded its configuration.
    #[must_use]
    pub fn new(
        props: FieldProps,
        config_loader: ConfigLoader,
        loader: L,
        events: UnboundedSender<ChangeEvent>,
    ) -> Self {
        let value = decode_or_empty(&props.value);
        let state = FieldState {
            configuration: None,
            text: value.description().unwrap_or_default().to_owned(),
            phase: FieldPhase::settled(&value),
            value,
            candidates: Vec::new(),
        };
        let (unmounted, _) = watch::channel(false);

        Self {
            props,
            config_loader,
            provider: ProviderClient::new(loader),
            search: PredictionSearch::new(),
            resolver: PlaceResolver::default(),
            state: Mutex::new(state),
            unmounted,
            events,
        }
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: PlaceResolver) -> Self {
        self.resolver = resolver;
        self
    }

    #[must_use]
    pub fn props(&self) -> &FieldProps {
        &self.props
    }

    /// Loads the configuration and the places provider for its key.
    ///
    /// Later calls return [`MountOutcome::Ready`] without fetching again. If
    /// [`LocationField::unmount`] runs first, the fetch is dropped, nothing is
    /// written, and [`MountOutcome::Abandoned`] is returned.
    ///
    /// # Errors
    ///
    /// - [`FieldError::ConfigFetch`] if the configuration endpoint fails.
    /// - [`FieldError::ProviderLoad`] if the provider rejects the configured key.
    pub async fn mount(&self) -> Result<MountOutcome, FieldError> {
        let loaded_key = self
            .state
            .lock()
            .await
            .configuration
            .as_ref()
            .map(|c| c.provider_key.clone());

        let provider_key = if let Some(key) = loaded_key {
            key
        } else {
            let unmounted = self.unmounted.subscribe();
            if *unmounted.borrow() {
                return Ok(MountOutcome::Abandoned);
            }
            let configuration = tokio::select! {
                loaded = self.config_loader.load() => loaded?,
                () = wait_unmounted(unmounted) => {
                    tracing::debug!(field = %self.props.name, "unmounted before configuration arrived");
                    return Ok(MountOutcome::Abandoned);
                }
            };
            let key = configuration.provider_key.clone();
            self.state.lock().await.configuration = Some(configuration);
            key
        };

        self.provider.ensure_loaded(&provider_key).await?;

        tracing::info!(field = %self.props.name, "location field mounted");
        Ok(MountOutcome::Ready)
    }

    /// Abandons any configuration fetch still in flight.
    pub fn unmount(&self) {
        self.unmounted.send_replace(true);
    }

    /// Handles typed text.
    ///
    /// Empty text clears the candidates and the value and reports `"null"`.
    /// Other text starts a search; its result replaces the candidate list
    /// only if no newer search was started meanwhile. The value is not
    /// touched.
    ///
    /// # Errors
    ///
    /// - [`FieldError::NotReady`] before [`LocationField::mount`] succeeded.
    /// - [`FieldError::ProviderLoad`] if the provider could not be loaded.
    pub async fn on_text_change(&self, text: &str) -> Result<(), FieldError> {
        if self.ignore_when_disabled("text change") {
            return Ok(());
        }

        if text.is_empty() {
            let encoded = {
                let mut guard = self.state.lock().await;
                let state = &mut *guard;
                self.search.invalidate();
                state.text.clear();
                state.candidates.clear();
                state.value = LocationValue::Empty;
                state.phase = FieldPhase::Idle;
                encode(&state.value)
            };
            self.emit(encoded);
            return Ok(());
        }

        let (provider_key, options, ticket) = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;
            let Some(configuration) = &state.configuration else {
                return Err(FieldError::NotReady);
            };
            let provider_key = configuration.provider_key.clone();
            let options = configuration.autocomplete_options.clone();
            text.clone_into(&mut state.text);
            state.phase = FieldPhase::Searching;
            // Issued under the lock so ticket order matches text order.
            (provider_key, options, self.search.issue())
        };

        let session = match self.provider.ensure_loaded(&provider_key).await {
            Ok(session) => session,
            Err(e) => {
                let mut state = self.state.lock().await;
                if self.search.is_latest(ticket) {
                    state.phase = FieldPhase::settled(&state.value);
                }
                return Err(e.into());
            }
        };

        let candidates = self.search.search(&*session, text, &options).await;

        let mut state = self.state.lock().await;
        if !self.search.is_latest(ticket) {
            tracing::debug!(query = %text, "discarding superseded prediction response");
            return Ok(());
        }
        state.candidates = candidates;
        state.phase = FieldPhase::PredictionsReady;
        Ok(())
    }

    /// Handles a combobox selection.
    ///
    /// An empty selection clears the field. A selection matching a listed
    /// candidate id is resolved through the provider; if resolution fails the
    /// previous value stays. Anything else becomes a custom location named
    /// after the selection.
    ///
    /// # Errors
    ///
    /// - [`FieldError::NotReady`] when a candidate is selected before mount.
    /// - [`FieldError::ProviderLoad`] if the provider could not be loaded.
    pub async fn on_select(&self, selection: Option<&str>) -> Result<(), FieldError> {
        if self.ignore_when_disabled("selection") {
            return Ok(());
        }
        let Some(selection) = selection.filter(|s| !s.is_empty()) else {
            self.clear().await;
            return Ok(());
        };

        let pending = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;
            let listed = state
                .candidates
                .iter()
                .find(|c| c.id == selection)
                .map(|c| c.description.clone());
            match listed {
                None => {
                    self.search.invalidate();
                    state.value = PlaceResolver::create_custom(selection);
                    selection.clone_into(&mut state.text);
                    state.phase = FieldPhase::Custom;
                    let encoded = encode(&state.value);
                    drop(guard);
                    self.emit(encoded);
                    return Ok(());
                }
                Some(description) => {
                    let Some(configuration) = &state.configuration else {
                        return Err(FieldError::NotReady);
                    };
                    let pending = (
                        configuration.provider_key.clone(),
                        configuration.detail_fields.clone(),
                        state.candidates.clone(),
                    );
                    state.text = description;
                    state.phase = FieldPhase::Resolving;
                    pending
                }
            }
        };
        let (provider_key, detail_fields, candidates) = pending;

        let session = match self.provider.ensure_loaded(&provider_key).await {
            Ok(session) => session,
            Err(e) => {
                self.restore_phase().await;
                return Err(e.into());
            }
        };

        let resolved = self
            .resolver
            .resolve(&*session, selection, &candidates, &detail_fields)
            .await;

        let Some(value) = resolved else {
            self.restore_phase().await;
            return Ok(());
        };
        let encoded = {
            let mut state = self.state.lock().await;
            state.value = value;
            state.phase = FieldPhase::Resolved;
            encode(&state.value)
        };
        self.emit(encoded);
        Ok(())
    }

    /// Clears the field; same as selecting nothing. Always reports `"null"`.
    pub async fn on_clear(&self) {
        if self.ignore_when_disabled("clear") {
            return;
        }
        self.clear().await;
    }

    /// Sets or clears one coordinate of the current value and reports it.
    ///
    /// An empty field becomes a custom location with an empty description.
    /// Every other part of the value is kept.
    pub async fn on_coordinate_edit(&self, coordinate: Option<f64>, axis: Axis) {
        if self.ignore_when_disabled("coordinate edit") {
            return;
        }
        let encoded = {
            let mut state = self.state.lock().await;
            state.value = state.value.with_coordinate(axis, coordinate);
            state.phase = FieldPhase::settled(&state.value);
            encode(&state.value)
        };
        self.emit(encoded);
    }

    /// Replaces the value from the host, e.g. when the form is reset.
    ///
    /// Nothing is reported back; the host already knows the value.
    pub async fn set_value(&self, raw: impl Into<RawValue>) {
        let value = decode_or_empty(&raw.into());
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        value.description().unwrap_or_default().clone_into(&mut state.text);
        state.phase = FieldPhase::settled(&value);
        state.value = value;
    }

    pub async fn value(&self) -> LocationValue {
        self.state.lock().await.value.clone()
    }

    /// The value as the host stores it.
    pub async fn encoded_value(&self) -> String {
        encode(&self.state.lock().await.value)
    }

    pub async fn display_text(&self) -> String {
        self.state.lock().await.text.clone()
    }

    pub async fn candidates(&self) -> Vec<Candidate> {
        self.state.lock().await.candidates.clone()
    }

    pub async fn phase(&self) -> FieldPhase {
        self.state.lock().await.phase
    }

    pub async fn configuration(&self) -> Option<Configuration> {
        self.state.lock().await.configuration.clone()
    }

    /// Entries for the combobox; see [`build_options`].
    pub async fn options(&self) -> Vec<ComboboxOption> {
        let state = self.state.lock().await;
        build_options(&state.candidates, &state.value)
    }

    /// Manual coordinate inputs are offered only for custom locations.
    pub async fn shows_coordinate_inputs(&self) -> bool {
        self.state.lock().await.value.is_custom()
    }

    #[must_use]
    pub fn create_message(text: &str) -> String {
        create_message(text)
    }

    async fn clear(&self) {
        self.search.invalidate();
        let encoded = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;
            state.text.clear();
            state.candidates.clear();
            state.value = LocationValue::Empty;
            state.phase = FieldPhase::Idle;
            encode(&state.value)
        };
        self.emit(encoded);
    }

    async fn restore_phase(&self) {
        let mut state = self.state.lock().await;
        if state.phase == FieldPhase::Resolving {
            state.phase = FieldPhase::PredictionsReady;
        }
    }

    fn ignore_when_disabled(&self, interaction: &str) -> bool {
        if self.props.disabled {
            tracing::debug!(field = %self.props.name, interaction, "field disabled, ignoring");
        }
        self.props.disabled
    }

    fn emit(&self, value: String) {
        tracing::debug!(field = %self.props.name, %value, "location value changed");
        let event = ChangeEvent::new(&self.props.name, value, &self.props.attribute_type);
        if self.events.send(event).is_err() {
            tracing::debug!(field = %self.props.name, "change listener gone, event dropped");
        }
    }
}

async fn wait_unmounted(mut unmounted: watch::Receiver<bool>) {
    let _ = unmounted.wait_for(|gone| *gone).await;
}
