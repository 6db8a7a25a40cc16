//! HTTP-based `RoutingBackend` using OSRM's Route API.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use url::Url;
use wayfinder_core::{RouteError, RouteRequest, RouteResponse, RoutingBackend};

use super::osrm::RouteServiceResponse;
use crate::client::{build_client, normalise_base_url};
use crate::ProviderBuildError;

/// Default user agent for OSRM requests.
pub const DEFAULT_USER_AGENT: &str = "wayfinder-routing/0.1";

/// Public OSRM demo server.
pub const DEFAULT_BASE_URL: &str = "https://router.project-osrm.org";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`HttpRoutingBackend`].
#[derive(Debug, Clone)]
pub struct HttpRoutingBackendConfig {
    /// Base URL for the OSRM service (e.g., `"http://localhost:5000"`).
    pub base_url: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for HttpRoutingBackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpRoutingBackendConfig {
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
}

/// Routing backend backed by an OSRM server.
///
/// Requests ask for GeoJSON geometry and per-step maneuvers. A non-`Ok`
/// OSRM code is returned as a response, not an error, so the caller can
/// tell "no route" apart from transport failures.
#[derive(Debug)]
pub struct HttpRoutingBackend {
    client: Client,
    base_url: String,
    config: HttpRoutingBackendConfig,
}

impl HttpRoutingBackend {
    /// Create a backend with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails
    /// to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(HttpRoutingBackendConfig::new(base_url))
    }

    /// Create a backend with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails
    /// to build.
    pub fn with_config(config: HttpRoutingBackendConfig) -> Result<Self, ProviderBuildError> {
        let base_url = normalise_base_url(&config.base_url)?;
        let client = build_client(&config.user_agent, config.timeout)?;
        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    /// Build the OSRM Route API URL.
    ///
    /// The format is `{base_url}/route/v1/{profile}/{lng},{lat};{lng},{lat}`
    /// followed by the geometry and step options.
    fn build_route_url(&self, request: &RouteRequest) -> Result<Url, RouteError> {
        let raw = format!(
            "{}/route/v1/{}/{},{};{},{}",
            self.base_url,
            request.mode.profile(),
            request.origin.lng(),
            request.origin.lat(),
            request.destination.lng(),
            request.destination.lat(),
        );
        let overview = if request.full_geometry { "full" } else { "simplified" };
        Url::parse_with_params(
            &raw,
            [
                ("overview", overview),
                ("geometries", "geojson"),
                ("steps", bool_param(request.want_steps)),
                ("alternatives", bool_param(request.alternatives)),
            ],
        )
        .map_err(|err| RouteError::Network {
            url: raw.clone(),
            message: err.to_string(),
        })
    }

    /// Convert a reqwest error to a `RouteError`.
    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> RouteError {
        if error.is_timeout() {
            return RouteError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return RouteError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        RouteError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

const fn bool_param(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

/// Decode an OSRM body. Error statuses are accepted when the body carries
/// the usual envelope.
fn decode_body(url: &str, status: u16, body: &str) -> Result<RouteResponse, RouteError> {
    match serde_json::from_str::<RouteServiceResponse>(body) {
        Ok(parsed) => Ok(parsed.into()),
        Err(err) if (200..300).contains(&status) => Err(RouteError::Parse {
            message: err.to_string(),
        }),
        Err(_) => Err(RouteError::Http {
            url: url.to_owned(),
            status,
            message: body.chars().take(200).collect(),
        }),
    }
}

#[async_trait(?Send)]
impl RoutingBackend for HttpRoutingBackend {
    async fn fetch_route(&self, request: &RouteRequest) -> Result<RouteResponse, RouteError> {
        let url = self.build_route_url(request)?;
        debug!("requesting {} route from {url}", request.mode.profile());

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url.as_str()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url.as_str()))?;

        decode_body(url.as_str(), status, &body)
    }
}
