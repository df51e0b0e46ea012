//! Client for the host's `GET /location-field/config` endpoint.

use std::time::Duration;

use locfield_core::Configuration;
use reqwest::{Client, Url};
use serde_json::Value;

use crate::error::ConfigFetchError;

const CONFIG_PATH: &str = "location-field/config";

/// Fetches the provider key, detail fields and autocomplete options for a field.
pub struct ConfigLoader {
    client: Client,
    url: Url,
    token: Option<String>,
}

impl ConfigLoader {
    /// Creates a loader for the host at `admin_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigFetchError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`ConfigFetchError::InvalidBaseUrl`] if `admin_url` does not parse.
    pub fn new(admin_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ConfigFetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", admin_url.trim_end_matches('/'));
        let url = Url::parse(&normalised)
            .and_then(|base| base.join(CONFIG_PATH))
            .map_err(|e| ConfigFetchError::InvalidBaseUrl(format!("'{admin_url}': {e}")))?;

        Ok(Self {
            client,
            url,
            token: None,
        })
    }

    /// Sends `token` as a bearer credential, as the host's admin fetch client does.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Fetches the configuration once. Not retried.
    ///
    /// The returned configuration always requests the `geometry` detail field.
    ///
    /// # Errors
    ///
    /// - [`ConfigFetchError::Http`] on network failure.
    /// - [`ConfigFetchError::UnexpectedStatus`] on a non-2xx response.
    /// - [`ConfigFetchError::Deserialize`] if the body is not the expected shape.
    pub async fn load(&self) -> Result<Configuration, ConfigFetchError> {
        let mut request = self
            .client
            .get(self.url.clone())
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ConfigFetchError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.url.to_string(),
            });
        }

        let body = response.text().await?;
        let configuration = parse_configuration(&body)?.with_geometry();
        tracing::info!(
            detail_fields = ?configuration.detail_fields,
            has_key = !configuration.provider_key.is_empty(),
            "location field configuration loaded"
        );
        Ok(configuration)
    }
}

/// Parses the endpoint body, accepting it bare or wrapped in a `data` envelope.
fn parse_configuration(body: &str) -> Result<Configuration, ConfigFetchError> {
    let mut json: Value = serde_json::from_str(body).map_err(ConfigFetchError::Deserialize)?;
    if json.get("googleMapsApiKey").is_none() {
        if let Some(inner) = json.get_mut("data").filter(|d| d.is_object()) {
            json = inner.take();
        }
    }
    serde_json::from_value(json).map_err(ConfigFetchError::Deserialize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_url_is_joined_under_the_admin_url() {
        let loader = ConfigLoader::new("http://localhost:1337/admin/", 5, "test").unwrap();
        assert_eq!(
            loader.url().as_str(),
            "http://localhost:1337/admin/location-field/config"
        );
    }

    #[test]
    fn invalid_admin_url_is_rejected() {
        assert!(matches!(
            ConfigLoader::new("::nope::", 5, "test"),
            Err(ConfigFetchError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn parse_configuration_accepts_data_envelope() {
        let cfg = parse_configuration(
            r#"{"data":{"googleMapsApiKey":"k","fields":["photo"],"autocompletionRequestOptions":{}}}"#,
        )
        .unwrap();
        assert_eq!(cfg.provider_key, "k");
        assert_eq!(cfg.detail_fields, vec!["photo"]);
    }

    #[test]
    fn parse_configuration_rejects_non_json() {
        assert!(matches!(
            parse_configuration("<html>"),
            Err(ConfigFetchError::Deserialize(_))
        ));
    }
}
