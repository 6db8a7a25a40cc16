//! Acquisition session state.
//!
//! [`AcquisitionSession`] is plain data plus the transitions the tracker is
//! allowed to make. It performs no I/O, which keeps the state machine
//! testable without a runtime.

use std::time::Duration;

use thiserror::Error;
use wayfinder_core::{PositionError, WatchHandle};

/// Where the state machine is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcquisitionStatus {
    /// Not tracking.
    #[default]
    Idle,
    /// A one-shot request, fallback, retry or restart is in progress.
    Requesting,
    /// A continuous watch is delivering samples.
    Watching,
    /// Acquisition gave up. See [`AcquisitionSession::last_error`].
    Failed,
}

/// A timer the session is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingTimer {
    /// Pause before retry `attempt`.
    RetryDelay {
        /// 1-based retry number.
        attempt: u32,
    },
    /// Pause before restarting after a watch timeout.
    RestartDelay {
        /// Length of the pause.
        delay: Duration,
    },
}

/// Why acquisition failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcquisitionError {
    /// The host has no position capability.
    #[error("geolocation is not supported by this client")]
    Unsupported,
    /// The user refused location access.
    #[error("location access denied")]
    PermissionDenied {
        /// Platform-specific instructions for re-enabling access.
        remediation: String,
    },
    /// A provider error the engine does not retry.
    #[error(transparent)]
    Position(PositionError),
    /// Every retry failed.
    #[error("no fix after {attempts} retries")]
    RetriesExhausted {
        /// Retries issued.
        attempts: u32,
    },
}

/// State of one acquisition session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionSession {
    status: AcquisitionStatus,
    retry_count: u32,
    max_retries: u32,
    watch_handle: Option<WatchHandle>,
    last_error: Option<AcquisitionError>,
    pending_timer: Option<PendingTimer>,
}

impl AcquisitionSession {
    /// An idle session with the given retry budget.
    #[must_use]
    pub const fn new(max_retries: u32) -> Self {
        Self {
            status: AcquisitionStatus::Idle,
            retry_count: 0,
            max_retries,
            watch_handle: None,
            last_error: None,
            pending_timer: None,
        }
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> AcquisitionStatus {
        self.status
    }

    /// Retries issued since the session (re)started.
    #[must_use]
    pub const fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Retry budget.
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Handle of the active watch.
    #[must_use]
    pub const fn watch_handle(&self) -> Option<WatchHandle> {
        self.watch_handle
    }

    /// Why the session failed, if it did.
    #[must_use]
    pub const fn last_error(&self) -> Option<&AcquisitionError> {
        self.last_error.as_ref()
    }

    /// Timer the session is waiting on.
    #[must_use]
    pub const fn pending_timer(&self) -> Option<PendingTimer> {
        self.pending_timer
    }

    /// Enter `Requesting` with a fresh retry budget.
    pub fn begin(&mut self) {
        self.status = AcquisitionStatus::Requesting;
        self.retry_count = 0;
        self.last_error = None;
        self.pending_timer = None;
    }

    /// Consume one retry. Returns the 1-based attempt number, or `None`
    /// when the budget is spent.
    pub fn next_retry(&mut self) -> Option<u32> {
        if self.retry_count >= self.max_retries {
            return None;
        }
        self.retry_count += 1;
        Some(self.retry_count)
    }

    /// Whether every retry has been issued.
    #[must_use]
    pub const fn retries_exhausted(&self) -> bool {
        self.retry_count >= self.max_retries
    }

    /// Record a timer the session is waiting on.
    pub fn set_timer(&mut self, timer: PendingTimer) {
        self.pending_timer = Some(timer);
    }

    /// Forget the pending timer.
    pub fn clear_timer(&mut self) {
        self.pending_timer = None;
    }

    /// Enter `Watching` on `handle`. Returns the previous handle, which the
    /// caller must stop.
    pub fn enter_watching(&mut self, handle: WatchHandle) -> Option<WatchHandle> {
        self.status = AcquisitionStatus::Watching;
        self.pending_timer = None;
        self.watch_handle.replace(handle)
    }

    /// Whether `handle` is the session's active watch.
    #[must_use]
    pub fn owns_watch(&self, handle: WatchHandle) -> bool {
        self.watch_handle == Some(handle)
    }

    /// The watch timed out: drop its handle and go back to `Requesting`.
    /// Returns the handle to stop.
    pub fn watch_timed_out(&mut self) -> Option<WatchHandle> {
        self.status = AcquisitionStatus::Requesting;
        self.watch_handle.take()
    }

    /// Enter `Failed`.
    pub fn fail(&mut self, error: AcquisitionError) {
        self.status = AcquisitionStatus::Failed;
        self.pending_timer = None;
        self.last_error = Some(error);
    }

    /// Return to `Idle`, clearing everything. Returns the watch handle to
    /// stop, if one was active.
    pub fn reset(&mut self) -> Option<WatchHandle> {
        self.status = AcquisitionStatus::Idle;
        self.retry_count = 0;
        self.last_error = None;
        self.pending_timer = None;
        self.watch_handle.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use wayfinder_core::PositionErrorCode;

    #[fixture]
    fn session() -> AcquisitionSession {
        let mut session = AcquisitionSession::new(3);
        session.begin();
        session
    }

    #[rstest]
    fn retry_budget_is_bounded(mut session: AcquisitionSession) {
        let attempts: Vec<u32> = std::iter::from_fn(|| session.next_retry()).collect();
        assert_eq!(attempts, [1, 2, 3]);
        assert!(session.retries_exhausted());
        assert_eq!(session.next_retry(), None);
        assert_eq!(session.retry_count(), 3);
    }

    #[rstest]
    fn begin_resets_after_failure(mut session: AcquisitionSession) {
        while session.next_retry().is_some() {}
        session.fail(AcquisitionError::RetriesExhausted { attempts: 3 });
        assert_eq!(session.status(), AcquisitionStatus::Failed);

        session.begin();

        assert_eq!(session.status(), AcquisitionStatus::Requesting);
        assert_eq!(session.retry_count(), 0);
        assert_eq!(session.last_error(), None);
    }

    #[rstest]
    fn watching_replaces_the_previous_handle(mut session: AcquisitionSession) {
        assert_eq!(session.enter_watching(WatchHandle(1)), None);
        assert_eq!(session.enter_watching(WatchHandle(2)), Some(WatchHandle(1)));
        assert!(session.owns_watch(WatchHandle(2)));
        assert!(!session.owns_watch(WatchHandle(1)));
    }

    #[rstest]
    fn watch_timeout_returns_to_requesting(mut session: AcquisitionSession) {
        session.enter_watching(WatchHandle(7));
        assert_eq!(session.watch_timed_out(), Some(WatchHandle(7)));
        assert_eq!(session.status(), AcquisitionStatus::Requesting);
        assert_eq!(session.watch_handle(), None);
    }

    #[rstest]
    fn reset_clears_timer_and_watch(mut session: AcquisitionSession) {
        session.set_timer(PendingTimer::RetryDelay { attempt: 1 });
        session.enter_watching(WatchHandle(3));
        session.set_timer(PendingTimer::RestartDelay {
            delay: Duration::from_secs(1),
        });

        assert_eq!(session.reset(), Some(WatchHandle(3)));
        assert_eq!(session.status(), AcquisitionStatus::Idle);
        assert_eq!(session.pending_timer(), None);
        assert_eq!(session.reset(), None);
    }

    #[rstest]
    fn position_errors_display_transparently() {
        let err = AcquisitionError::Position(PositionError::new(
            PositionErrorCode::Unknown,
            "sensor offline",
        ));
        assert!(err.to_string().contains("sensor offline"));
    }
}
