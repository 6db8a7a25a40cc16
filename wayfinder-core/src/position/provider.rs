//! Position provider trait and the values it exchanges.

use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedReceiver;

use super::error::PositionError;
use crate::{AccuracyClass, Coordinate};

/// A successful fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSample {
    /// Where the device is.
    pub coordinate: Coordinate,
    /// Radius of the 68% confidence circle in metres.
    pub accuracy_meters: f64,
    /// When the platform captured the fix.
    pub captured_at: SystemTime,
}

impl PositionSample {
    /// Construct a sample captured now. Negative accuracy is clamped to zero.
    #[must_use]
    pub fn new(coordinate: Coordinate, accuracy_meters: f64) -> Self {
        Self {
            coordinate,
            accuracy_meters: accuracy_meters.max(0.0),
            captured_at: SystemTime::now(),
        }
    }

    /// Bucket this sample's accuracy.
    #[must_use]
    pub fn accuracy_class(&self) -> AccuracyClass {
        AccuracyClass::classify(self.accuracy_meters)
    }
}

/// Options for a one-shot request or a watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    /// Ask for GPS-grade accuracy at the cost of latency and power.
    pub high_accuracy: bool,
    /// Oldest cached fix the platform may return instead of a fresh one.
    pub max_cache_age: Duration,
    /// How long the platform may take before failing with a timeout.
    pub timeout: Duration,
}

/// Opaque identifier for an active watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchHandle(pub u64);

/// One delivery from a continuous watch.
pub type WatchEvent = Result<PositionSample, PositionError>;

/// A started watch: its handle plus the stream of deliveries.
///
/// The stream ends once the provider stops the watch.
#[derive(Debug)]
pub struct Watch {
    /// Handle to pass to [`PositionProvider::stop_watch`].
    pub handle: WatchHandle,
    /// Samples and errors in platform delivery order.
    pub events: UnboundedReceiver<WatchEvent>,
}

/// Host capability for locating the device.
///
/// Implementations run on the host's single-threaded event loop, hence the
/// `?Send` futures.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use tokio::sync::mpsc;
/// use wayfinder_core::{
///     Coordinate, PositionError, PositionErrorCode, PositionOptions, PositionProvider,
///     PositionSample, Watch, WatchHandle,
/// };
///
/// struct Fixed(Coordinate);
///
/// #[async_trait(?Send)]
/// impl PositionProvider for Fixed {
///     fn is_available(&self) -> bool {
///         true
///     }
///
///     async fn request_once(
///         &self,
///         _options: PositionOptions,
///     ) -> Result<PositionSample, PositionError> {
///         Ok(PositionSample::new(self.0, 5.0))
///     }
///
///     fn start_watch(&self, _options: PositionOptions) -> Watch {
///         let (_tx, events) = mpsc::unbounded_channel();
///         Watch { handle: WatchHandle(1), events }
///     }
///
///     fn stop_watch(&self, _handle: WatchHandle) {}
/// }
/// ```
#[async_trait(?Send)]
pub trait PositionProvider {
    /// Whether the host exposes a position capability at all.
    fn is_available(&self) -> bool;

    /// Request a single fix.
    async fn request_once(&self, options: PositionOptions)
    -> Result<PositionSample, PositionError>;

    /// Start delivering fixes continuously.
    fn start_watch(&self, options: PositionOptions) -> Watch;

    /// Stop a watch. Unknown or already-stopped handles are ignored.
    fn stop_watch(&self, handle: WatchHandle);
}
