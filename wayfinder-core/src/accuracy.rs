//! Accuracy classification for position fixes.

/// Upper bound (exclusive) of a [`AccuracyClass::Good`] fix, in metres.
pub const GOOD_ACCURACY_METERS: f64 = 200.0;

/// Upper bound (inclusive) of a [`AccuracyClass::Fair`] fix, in metres.
/// Anything beyond is low accuracy and surfaces an advisory.
pub const LOW_ACCURACY_METERS: f64 = 1000.0;

/// Coarse quality bucket for a fix's reported accuracy radius.
///
/// # Examples
///
/// ```
/// use wayfinder_core::AccuracyClass;
///
/// assert_eq!(AccuracyClass::classify(35.0), AccuracyClass::Good);
/// assert_eq!(AccuracyClass::classify(1000.0), AccuracyClass::Fair);
/// assert!(AccuracyClass::classify(2500.0).needs_advisory());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccuracyClass {
    /// Below 200 m.
    Good,
    /// 200 m up to and including 1000 m.
    Fair,
    /// Above 1000 m.
    Poor,
}

impl AccuracyClass {
    /// Bucket an accuracy radius in metres.
    #[must_use]
    pub fn classify(accuracy_meters: f64) -> Self {
        if accuracy_meters < GOOD_ACCURACY_METERS {
            Self::Good
        } else if accuracy_meters <= LOW_ACCURACY_METERS {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    /// Colour used for the tracking marker's accuracy circle.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Good => "#4CAF50",
            Self::Fair => "#FFC107",
            Self::Poor => "#FF5722",
        }
    }

    /// Whether the low-accuracy advisory should be shown.
    #[must_use]
    pub const fn needs_advisory(self) -> bool {
        matches!(self, Self::Poor)
    }
}

/// Zoom level for centring on a first fix: tighter fixes zoom closer.
#[must_use]
pub fn zoom_for_accuracy(accuracy_meters: f64) -> u8 {
    if accuracy_meters < 100.0 {
        17
    } else if accuracy_meters < 500.0 {
        15
    } else {
        14
    }
}
