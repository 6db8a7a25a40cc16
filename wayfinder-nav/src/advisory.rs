//! User-facing advisory messages.
//!
//! The board holds a single message. Publishing replaces whatever was
//! showing; dismissing clears it without side effects.

use std::fmt;

/// A message for the user about location or routing trouble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    /// The host cannot locate the device at all.
    Unsupported,
    /// The user refused location access.
    PermissionDenied {
        /// Platform-specific instructions for re-enabling access.
        remediation: String,
    },
    /// A retry is about to be issued.
    RetryProgress {
        /// 1-based retry number.
        attempt: u32,
        /// Retry budget.
        max: u32,
    },
    /// The latest fix is too coarse to rely on.
    LowAccuracy,
    /// Acquisition failed for a reason the engine does not retry.
    LocationFailed {
        /// Platform error text.
        detail: String,
    },
    /// Every retry failed.
    RetriesExhausted,
    /// The routing backend could not produce a route.
    RouteFailed,
}

impl Advisory {
    /// Whether this message describes acquisition progress or fix quality,
    /// and therefore becomes obsolete once a good fix arrives.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::RetryProgress { .. } | Self::LowAccuracy)
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported => f.write_str("Geolocation is not supported by your browser"),
            Self::PermissionDenied { remediation } => {
                write!(f, "Location access denied. {remediation}")
            }
            Self::RetryProgress { attempt, max } => {
                write!(f, "Trying to get your location (attempt {attempt}/{max})...")
            }
            Self::LowAccuracy => f.write_str(
                "Location accuracy is low. Try moving to an area with better GPS signal or wifi connectivity.",
            ),
            Self::LocationFailed { detail } => write!(f, "Couldn't get your location. {detail}"),
            Self::RetriesExhausted => f.write_str(
                "Unable to get your location after multiple attempts. Please check your settings.",
            ),
            Self::RouteFailed => f.write_str("Could not calculate route. Please try again."),
        }
    }
}

/// Single-slot holder for the current [`Advisory`].
#[derive(Debug, Default)]
pub struct AdvisoryBoard {
    current: Option<Advisory>,
}

impl AdvisoryBoard {
    /// An empty board.
    #[must_use]
    pub const fn new() -> Self {
        Self { current: None }
    }

    /// Replace the current message.
    pub fn publish(&mut self, advisory: Advisory) {
        log::debug!("advisory: {advisory}");
        self.current = Some(advisory);
    }

    /// The message on display, if any.
    #[must_use]
    pub const fn current(&self) -> Option<&Advisory> {
        self.current.as_ref()
    }

    /// Clear the message at the user's request.
    pub fn dismiss(&mut self) {
        self.current = None;
    }

    /// Clear the message when it satisfies `predicate`.
    pub fn clear_if(&mut self, predicate: impl FnOnce(&Advisory) -> bool) {
        if self.current.as_ref().is_some_and(predicate) {
            self.current = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(
        Advisory::RetryProgress { attempt: 2, max: 3 },
        "Trying to get your location (attempt 2/3)..."
    )]
    #[case(
        Advisory::LocationFailed { detail: "Sensor offline".to_owned() },
        "Couldn't get your location. Sensor offline"
    )]
    #[case(
        Advisory::PermissionDenied { remediation: "Open settings.".to_owned() },
        "Location access denied. Open settings."
    )]
    #[case(Advisory::RouteFailed, "Could not calculate route. Please try again.")]
    fn renders_user_text(#[case] advisory: Advisory, #[case] expected: &str) {
        assert_eq!(advisory.to_string(), expected);
    }

    #[rstest]
    fn clear_if_leaves_unrelated_messages() {
        let mut board = AdvisoryBoard::new();
        board.publish(Advisory::RouteFailed);
        board.clear_if(Advisory::is_transient);
        assert_eq!(board.current(), Some(&Advisory::RouteFailed));

        board.publish(Advisory::LowAccuracy);
        board.clear_if(Advisory::is_transient);
        assert_eq!(board.current(), None);
    }
}
