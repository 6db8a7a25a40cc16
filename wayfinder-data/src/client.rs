//! HTTP client construction shared by the service adapters.

use std::time::Duration;

use reqwest::Client;
use url::Url;

/// Error type for adapter construction failures.
#[derive(Debug)]
pub enum ProviderBuildError {
    /// Failed to build the HTTP client.
    HttpClient(reqwest::Error),
    /// The configured base URL is not a valid absolute URL.
    BaseUrl {
        /// The rejected value.
        base_url: String,
        /// Parser failure.
        source: url::ParseError,
    },
}

impl std::fmt::Display for ProviderBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HttpClient(err) => write!(f, "failed to build HTTP client: {err}"),
            Self::BaseUrl { base_url, source } => {
                write!(f, "invalid base URL {base_url:?}: {source}")
            }
        }
    }
}

impl std::error::Error for ProviderBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::HttpClient(err) => Some(err),
            Self::BaseUrl { source, .. } => Some(source),
        }
    }
}

pub(crate) fn build_client(user_agent: &str, timeout: Duration) -> Result<Client, ProviderBuildError> {
    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(timeout)
        .timeout(timeout)
        .build()
        .map_err(ProviderBuildError::HttpClient)
}

/// Validate `base_url` and return it without a trailing slash.
pub(crate) fn normalise_base_url(base_url: &str) -> Result<String, ProviderBuildError> {
    Url::parse(base_url).map_err(|source| ProviderBuildError::BaseUrl {
        base_url: base_url.to_owned(),
        source,
    })?;
    Ok(base_url.trim_end_matches('/').to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("http://osrm.example.com/", "http://osrm.example.com")]
    #[case("http://osrm.example.com/osrm", "http://osrm.example.com/osrm")]
    fn base_urls_lose_trailing_slashes(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalise_base_url(raw).expect("valid URL"), expected);
    }

    #[rstest]
    fn relative_base_urls_are_rejected() {
        let err = normalise_base_url("osrm.example.com").expect_err("relative URL");
        assert!(matches!(err, ProviderBuildError::BaseUrl { .. }));
        assert!(err.to_string().contains("osrm.example.com"));
    }
}
