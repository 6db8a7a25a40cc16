//! HTTP-based `GeocodingBackend` using the Nominatim API.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use reqwest::header::ACCEPT_LANGUAGE;
use serde::de::DeserializeOwned;
use url::Url;
use wayfinder_core::{Coordinate, GeocodeError, GeocodingBackend, Place};

use super::nominatim::{ReverseEntry, SearchEntry};
use crate::ProviderBuildError;
use crate::client::{build_client, normalise_base_url};

/// Default user agent. Nominatim's usage policy requires an identifying one.
pub const DEFAULT_USER_AGENT: &str = "wayfinder-geocoding/0.1";

/// Public Nominatim instance.
pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_COURTESY_DELAY_MS: u64 = 300;

/// Configuration for [`NominatimGeocoder`].
#[derive(Debug, Clone)]
pub struct NominatimGeocoderConfig {
    /// Base URL for the Nominatim service.
    pub base_url: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Value of the `Accept-Language` header.
    pub language: String,
    /// Pause before every forward search.
    pub courtesy_delay: Duration,
}

impl Default for NominatimGeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            language: "en".to_owned(),
            courtesy_delay: Duration::from_millis(DEFAULT_COURTESY_DELAY_MS),
        }
    }
}

impl NominatimGeocoderConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the preferred result language.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set the pause before each search. `Duration::ZERO` disables it.
    #[must_use]
    pub fn with_courtesy_delay(mut self, delay: Duration) -> Self {
        self.courtesy_delay = delay;
        self
    }
}

/// Geocoding backend backed by a Nominatim server.
#[derive(Debug)]
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
    config: NominatimGeocoderConfig,
}

impl NominatimGeocoder {
    /// Create a geocoder with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails
    /// to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(NominatimGeocoderConfig::new(base_url))
    }

    /// Create a geocoder with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails
    /// to build.
    pub fn with_config(config: NominatimGeocoderConfig) -> Result<Self, ProviderBuildError> {
        let base_url = normalise_base_url(&config.base_url)?;
        let client = build_client(&config.user_agent, config.timeout)?;
        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    fn build_search_url(&self, query: &str, limit: usize) -> Result<Url, GeocodeError> {
        let raw = format!("{}/search", self.base_url);
        let limit = limit.to_string();
        Url::parse_with_params(
            &raw,
            [
                ("q", query),
                ("format", "json"),
                ("addressdetails", "1"),
                ("limit", limit.as_str()),
            ],
        )
        .map_err(|err| GeocodeError::Network {
            url: raw.clone(),
            message: err.to_string(),
        })
    }

    fn build_reverse_url(&self, at: Coordinate) -> Result<Url, GeocodeError> {
        let raw = format!("{}/reverse", self.base_url);
        let lat = at.lat().to_string();
        let lon = at.lng().to_string();
        Url::parse_with_params(
            &raw,
            [
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("format", "json"),
                ("addressdetails", "1"),
            ],
        )
        .map_err(|err| GeocodeError::Network {
            url: raw.clone(),
            message: err.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, GeocodeError> {
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT_LANGUAGE, &self.config.language)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url.as_str()))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, url.as_str()))?;

        response.json().await.map_err(|err| GeocodeError::Parse {
            message: err.to_string(),
        })
    }

    /// Convert a reqwest error to a `GeocodeError`.
    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> GeocodeError {
        if error.is_timeout() {
            return GeocodeError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return GeocodeError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        GeocodeError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

#[async_trait(?Send)]
impl GeocodingBackend for NominatimGeocoder {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Place>, GeocodeError> {
        let url = self.build_search_url(query, limit)?;
        if !self.config.courtesy_delay.is_zero() {
            tokio::time::sleep(self.config.courtesy_delay).await;
        }
        debug!("searching {url}");
        let entries: Vec<SearchEntry> = self.get_json(url).await?;
        let total = entries.len();
        let places: Vec<Place> = entries
            .into_iter()
            .filter_map(SearchEntry::into_place)
            .take(limit)
            .collect();
        if places.len() < total.min(limit) {
            warn!(
                "dropped {} search matches with unusable coordinates",
                total.min(limit) - places.len()
            );
        }
        Ok(places)
    }

    async fn reverse(&self, at: Coordinate) -> Result<Option<String>, GeocodeError> {
        let url = self.build_reverse_url(at)?;
        debug!("reverse geocoding {url}");
        let entry: ReverseEntry = self.get_json(url).await?;
        if let Some(reason) = entry.error {
            debug!("no address for {at}: {reason}");
        }
        Ok(entry.display_name.filter(|name| !name.trim().is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn geocoder() -> NominatimGeocoder {
        NominatimGeocoder::new("http://nominatim.example.com/").expect("geocoder should build")
    }

    #[rstest]
    fn search_url_encodes_query(geocoder: NominatimGeocoder) {
        let url = geocoder
            .build_search_url("King's Cross & St Pancras", 5)
            .expect("valid URL");
        assert_eq!(
            url.as_str(),
            "http://nominatim.example.com/search?q=King%27s+Cross+%26+St+Pancras\
             &format=json&addressdetails=1&limit=5"
        );
    }

    #[rstest]
    fn reverse_url_carries_coordinates(geocoder: NominatimGeocoder) {
        let at = Coordinate::new(51.5034, -0.1276).expect("valid");
        let url = geocoder.build_reverse_url(at).expect("valid URL");
        assert_eq!(
            url.as_str(),
            "http://nominatim.example.com/reverse?lat=51.5034&lon=-0.1276&format=json&addressdetails=1"
        );
    }

    #[rstest]
    fn config_builder_pattern() {
        let config = NominatimGeocoderConfig::new("http://example.com")
            .with_timeout(Duration::from_secs(3))
            .with_user_agent("test-agent/1.0")
            .with_language("fr")
            .with_courtesy_delay(Duration::ZERO);

        assert_eq!(config.base_url, "http://example.com");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.user_agent, "test-agent/1.0");
        assert_eq!(config.language, "fr");
        assert!(config.courtesy_delay.is_zero());
    }

    #[rstest]
    fn default_config_is_polite() {
        let config = NominatimGeocoderConfig::default();
        assert_eq!(config.language, "en");
        assert_eq!(config.courtesy_delay, Duration::from_millis(300));
    }
}
