use thiserror::Error;

/// Normalized reason a position query failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionErrorCode {
    /// The user or platform refused location access.
    PermissionDenied,
    /// The platform could not determine a position.
    Unavailable,
    /// No fix arrived within the request's timeout.
    Timeout,
    /// Any other platform failure.
    Unknown,
}

impl PositionErrorCode {
    /// Translate a W3C Geolocation error code (`1`, `2`, `3`).
    ///
    /// # Examples
    ///
    /// ```
    /// use wayfinder_core::PositionErrorCode;
    ///
    /// assert_eq!(PositionErrorCode::from_platform(1), PositionErrorCode::PermissionDenied);
    /// assert_eq!(PositionErrorCode::from_platform(42), PositionErrorCode::Unknown);
    /// ```
    #[must_use]
    pub const fn from_platform(code: u16) -> Self {
        match code {
            1 => Self::PermissionDenied,
            2 => Self::Unavailable,
            3 => Self::Timeout,
            _ => Self::Unknown,
        }
    }

    /// Whether the failure may clear up on its own and is worth retrying.
    #[must_use]
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::Unavailable | Self::Timeout)
    }
}

impl std::fmt::Display for PositionErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::PermissionDenied => "permission denied",
            Self::Unavailable => "position unavailable",
            Self::Timeout => "timeout",
            Self::Unknown => "unknown error",
        };
        f.write_str(label)
    }
}

/// A failed one-shot request or watch delivery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct PositionError {
    /// Normalized failure reason.
    pub code: PositionErrorCode,
    /// Platform-supplied detail.
    pub message: String,
}

impl PositionError {
    /// Construct an error from a code and message.
    pub fn new(code: PositionErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}
