use thiserror::Error;

/// Errors from [`crate::routing::RoutingBackend::fetch_route`] and route
/// normalization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The backend answered but found nothing usable.
    ///
    /// Raised for a non-`Ok` status code and for an empty route list.
    #[error("no route found (backend code {code})")]
    NoRouteFound {
        /// Backend status code.
        code: String,
    },

    /// The request could not reach the backend.
    #[error("network error contacting {url}: {message}")]
    Network {
        /// Fully qualified request URL.
        url: String,
        /// Transport error description.
        message: String,
    },

    /// The backend did not answer in time.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Fully qualified request URL.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },

    /// The backend answered with an HTTP error status.
    #[error("request to {url} failed with status {status}: {message}")]
    Http {
        /// Fully qualified request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Short error description.
        message: String,
    },

    /// The response body or geometry could not be interpreted.
    #[error("failed to parse routing response: {message}")]
    Parse {
        /// Parser error description.
        message: String,
    },
}

impl RouteError {
    /// Whether the error means "the backend had no answer" rather than a
    /// failure to talk to it.
    #[must_use]
    pub const fn is_no_route(&self) -> bool {
        matches!(self, Self::NoRouteFound { .. })
    }
}
