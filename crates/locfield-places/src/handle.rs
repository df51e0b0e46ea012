//! Single-flight cache of provider sessions, keyed by provider key.
//!
//! The first [`ProviderClient::ensure_loaded`] call for a key starts the load;
//! concurrent and later callers for the same key wait on that same load and
//! share its outcome. Failures are cached too, so a key that failed to load
//! reports the same error to every caller and is never retried.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};

use crate::error::PlacesError;
use crate::provider::PlacesLoader;

type LoadOutcome<S> = Result<Arc<S>, String>;

pub struct ProviderClient<L: PlacesLoader> {
    loader: L,
    handles: Mutex<HashMap<String, Arc<OnceCell<LoadOutcome<L::Session>>>>>,
}

impl<L: PlacesLoader> ProviderClient<L> {
    #[must_use]
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            handles: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the session for `api_key`, loading it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::ProviderLoad`] if the load for this key failed,
    /// now or on an earlier call.
    pub async fn ensure_loaded(&self, api_key: &str) -> Result<Arc<L::Session>, PlacesError> {
        let cell = {
            let mut handles = self.handles.lock().await;
            Arc::clone(handles.entry(api_key.to_owned()).or_default())
        };

        let outcome = cell
            .get_or_init(|| async {
                match self.loader.load(api_key).await {
                    Ok(session) => {
                        tracing::info!("places provider loaded");
                        Ok(Arc::new(session))
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "places provider failed to load");
                        Err(match e {
                            PlacesError::ProviderLoad(reason) => reason,
                            other => other.to_string(),
                        })
                    }
                }
            })
            .await;

        outcome.clone().map_err(PlacesError::ProviderLoad)
    }

    #[must_use]
    pub fn loader(&self) -> &L {
        &self.loader
    }
}
