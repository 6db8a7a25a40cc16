//! Position acquisition.
//!
//! [`PositionTracker`] drives an [`AcquisitionSession`] through the
//! acquisition phases on a local task:
//!
//! 1. a one-shot request with client-tuned options;
//! 2. one immediate fallback with the opposite accuracy preference;
//! 3. a bounded retry loop for transient failures;
//! 4. a continuous watch once any request succeeds;
//! 5. a delayed restart from step 1 whenever the watch times out or the
//!    host closes it.
//!
//! Every await point is raced against the run's [`CancellationToken`], and
//! results are applied only while the run's generation is current, so a
//! stopped session never touches the map again.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use wayfinder_core::accuracy::zoom_for_accuracy;
use wayfinder_core::{
    ClientProfile, IconSpec, LayerId, PositionError, PositionErrorCode, PositionOptions,
    PositionProvider, PositionSample, Watch, WatchHandle,
};

use crate::{
    AcquisitionError, AcquisitionPolicy, AcquisitionSession, AcquisitionStatus, Advisory,
    NavigatorConfig, PendingTimer, SharedAdvisories, SharedMap, options,
};

/// A fix the tracker has just applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixNotice {
    /// The sample now shown on the map.
    pub sample: PositionSample,
    /// `true` for the one-shot fix that opens a (re)started session,
    /// `false` for watch deliveries.
    pub initial: bool,
}

type FixListener = Rc<dyn Fn(FixNotice)>;

/// Owner of the acquisition session and its background task.
pub struct PositionTracker {
    inner: Rc<TrackerInner>,
}

struct TrackerInner {
    provider: Rc<dyn PositionProvider>,
    map: SharedMap,
    advisories: SharedAdvisories,
    policy: AcquisitionPolicy,
    prefer_fast_first_fix: bool,
    profile: ClientProfile,
    session: RefCell<AcquisitionSession>,
    position: Cell<Option<PositionSample>>,
    enabled: Cell<bool>,
    permission_denied: Cell<bool>,
    permission_asked: Cell<bool>,
    generation: Cell<u64>,
    consecutive_timeouts: Cell<u32>,
    run: RefCell<Option<ActiveRun>>,
    listener: RefCell<Option<FixListener>>,
}

struct ActiveRun {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl fmt::Debug for PositionTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PositionTracker")
            .field("session", &*self.inner.session.borrow())
            .field("enabled", &self.inner.enabled.get())
            .field("generation", &self.inner.generation.get())
            .finish_non_exhaustive()
    }
}

impl PositionTracker {
    /// Create an idle tracker.
    #[must_use]
    pub fn new(
        provider: Rc<dyn PositionProvider>,
        map: SharedMap,
        advisories: SharedAdvisories,
        config: &NavigatorConfig,
        profile: ClientProfile,
    ) -> Self {
        Self {
            inner: Rc::new(TrackerInner {
                provider,
                map,
                advisories,
                policy: config.acquisition.clone(),
                prefer_fast_first_fix: config.prefer_fast_first_fix,
                profile,
                session: RefCell::new(AcquisitionSession::new(config.acquisition.max_retries)),
                position: Cell::new(None),
                enabled: Cell::new(false),
                permission_denied: Cell::new(false),
                permission_asked: Cell::new(false),
                generation: Cell::new(0),
                consecutive_timeouts: Cell::new(0),
                run: RefCell::new(None),
                listener: RefCell::new(None),
            }),
        }
    }

    /// Register the callback invoked after every applied fix.
    ///
    /// The callback runs on the tracker task with no tracker state borrowed.
    pub fn set_fix_listener(&self, listener: impl Fn(FixNotice) + 'static) {
        *self.inner.listener.borrow_mut() = Some(Rc::new(listener));
    }

    /// Start a new session, tearing down any existing one first.
    ///
    /// # Panics
    ///
    /// Panics when called outside a [`tokio::task::LocalSet`].
    pub fn start(&self) {
        let inner = &self.inner;
        if inner.run.borrow().is_some() || inner.session.borrow().status() != AcquisitionStatus::Idle
        {
            self.stop();
        }
        inner.permission_asked.set(true);
        inner.consecutive_timeouts.set(0);
        if !inner.begin_attempt(false) {
            return;
        }
        let generation = inner.generation.get() + 1;
        inner.generation.set(generation);
        inner.enabled.set(true);
        info!("position tracking started (generation {generation})");

        let token = CancellationToken::new();
        let task = tokio::task::spawn_local(run(Rc::clone(inner), token.clone(), generation));
        *inner.run.borrow_mut() = Some(ActiveRun { token, task });
    }

    /// Stop tracking and return to `Idle`. A no-op when already idle.
    pub fn stop(&self) {
        let inner = &self.inner;
        let active = inner.run.borrow_mut().take();
        let idle = inner.session.borrow().status() == AcquisitionStatus::Idle;
        if active.is_none() && idle && !inner.enabled.get() {
            return;
        }
        inner.generation.set(inner.generation.get() + 1);
        if let Some(ActiveRun { token, task }) = active {
            token.cancel();
            task.abort();
        }
        let watch = inner.session.borrow_mut().reset();
        if let Some(handle) = watch {
            inner.provider.stop_watch(handle);
        }
        {
            let mut map = inner.map.borrow_mut();
            map.remove_layer(&LayerId::tracking_marker());
            map.remove_layer(&LayerId::accuracy_circle());
        }
        inner.position.set(None);
        inner.enabled.set(false);
        info!("position tracking stopped");
    }

    /// Snapshot of the session.
    #[must_use]
    pub fn session(&self) -> AcquisitionSession {
        self.inner.session.borrow().clone()
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> AcquisitionStatus {
        self.inner.session.borrow().status()
    }

    /// Whether a request, retry or restart is in progress.
    #[must_use]
    pub fn is_locating(&self) -> bool {
        self.status() == AcquisitionStatus::Requesting
    }

    /// Whether tracking is switched on.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.get()
    }

    /// The latest applied fix.
    #[must_use]
    pub fn current_position(&self) -> Option<PositionSample> {
        self.inner.position.get()
    }

    /// Whether the permission banner should be shown.
    #[must_use]
    pub fn permission_denied(&self) -> bool {
        self.inner.permission_denied.get()
    }

    /// Whether tracking has ever been started.
    #[must_use]
    pub fn permission_asked(&self) -> bool {
        self.inner.permission_asked.get()
    }

    /// Hide the permission banner without restarting acquisition.
    pub fn acknowledge_permission_banner(&self) {
        self.inner.permission_denied.set(false);
    }
}

impl TrackerInner {
    fn is_live(&self, generation: u64) -> bool {
        self.generation.get() == generation
    }

    /// Availability check and session reset shared by start and restart.
    /// A restart keeps advisories unrelated to acquisition. Returns `false`
    /// when the host cannot locate the device.
    fn begin_attempt(&self, restart: bool) -> bool {
        if !self.provider.is_available() {
            warn!("position provider unavailable");
            self.session.borrow_mut().fail(AcquisitionError::Unsupported);
            self.advisories.borrow_mut().publish(Advisory::Unsupported);
            self.enabled.set(false);
            return false;
        }
        self.session.borrow_mut().begin();
        {
            let mut advisories = self.advisories.borrow_mut();
            if restart {
                advisories.clear_if(Advisory::is_transient);
            } else {
                advisories.dismiss();
            }
        }
        self.permission_denied.set(false);
        true
    }

    /// Await `future` unless the run is cancelled first.
    async fn until_cancelled<T>(
        token: &CancellationToken,
        future: impl Future<Output = T>,
    ) -> Option<T> {
        tokio::select! {
            biased;
            () = token.cancelled() => None,
            value = future => Some(value),
        }
    }

    async fn request(
        &self,
        token: &CancellationToken,
        phase: &str,
        options: PositionOptions,
    ) -> Option<Result<PositionSample, PositionError>> {
        debug!("{phase} position request: {options:?}");
        let outcome = Self::until_cancelled(token, self.provider.request_once(options)).await?;
        if let Err(err) = &outcome {
            debug!("{phase} position request failed: {err}");
        }
        Some(outcome)
    }

    async fn wait(&self, token: &CancellationToken, timer: PendingTimer, delay: Duration) -> bool {
        self.session.borrow_mut().set_timer(timer);
        let finished = Self::until_cancelled(token, tokio::time::sleep(delay))
            .await
            .is_some();
        if finished {
            self.session.borrow_mut().clear_timer();
        }
        finished
    }

    /// Run the one-shot phases. Returns the first fix, or `None` once the
    /// session has failed or the run was cancelled.
    async fn acquire(&self, token: &CancellationToken) -> Option<PositionSample> {
        let initial = options::initial(self.prefer_fast_first_fix);
        if let Ok(sample) = self.request(token, "initial", initial).await? {
            return Some(sample);
        }

        let fallback = options::fallback(initial, &self.policy);
        let error = match self.request(token, "fallback", fallback).await? {
            Ok(sample) => return Some(sample),
            Err(error) => error,
        };
        if error.code == PositionErrorCode::PermissionDenied {
            self.fail_permission_denied();
            return None;
        }
        if !error.code.is_transient() {
            self.fail_unknown(error);
            return None;
        }

        loop {
            let next = self.session.borrow_mut().next_retry();
            let Some(attempt) = next else {
                self.fail_exhausted();
                return None;
            };
            let timer = PendingTimer::RetryDelay { attempt };
            if !self.wait(token, timer, self.policy.retry_delay).await {
                return None;
            }
            let max = self.policy.max_retries;
            self.advisories
                .borrow_mut()
                .publish(Advisory::RetryProgress { attempt, max });
            let retry = options::retry(attempt, &self.policy);
            match self.request(token, "retry", retry).await? {
                Ok(sample) => return Some(sample),
                Err(error) if error.code == PositionErrorCode::PermissionDenied => {
                    self.fail_permission_denied();
                    return None;
                }
                Err(_) if self.session.borrow().retries_exhausted() => {
                    self.fail_exhausted();
                    return None;
                }
                Err(_) => {}
            }
        }
    }

    fn fail_permission_denied(&self) {
        let remediation = self.profile.permission_help().to_owned();
        warn!("location permission denied");
        self.session
            .borrow_mut()
            .fail(AcquisitionError::PermissionDenied {
                remediation: remediation.clone(),
            });
        self.permission_denied.set(true);
        self.advisories
            .borrow_mut()
            .publish(Advisory::PermissionDenied { remediation });
        self.enabled.set(false);
    }

    fn fail_unknown(&self, error: PositionError) {
        warn!("position acquisition failed: {error}");
        self.advisories.borrow_mut().publish(Advisory::LocationFailed {
            detail: error.message.clone(),
        });
        self.session
            .borrow_mut()
            .fail(AcquisitionError::Position(error));
        self.enabled.set(false);
    }

    fn fail_exhausted(&self) {
        let attempts = self.session.borrow().retry_count();
        warn!("position acquisition failed after {attempts} retries");
        self.session
            .borrow_mut()
            .fail(AcquisitionError::RetriesExhausted { attempts });
        self.advisories
            .borrow_mut()
            .publish(Advisory::RetriesExhausted);
        self.enabled.set(false);
    }

    fn apply_fix(&self, generation: u64, sample: PositionSample, initial: bool) {
        if !self.is_live(generation) {
            debug!("ignoring fix from a stopped session");
            return;
        }
        self.position.set(Some(sample));
        let class = sample.accuracy_class();
        {
            let mut map = self.map.borrow_mut();
            map.add_or_move_marker(
                &LayerId::tracking_marker(),
                sample.coordinate,
                &IconSpec::PulsingDot,
            );
            map.add_or_move_marker(
                &LayerId::accuracy_circle(),
                sample.coordinate,
                &IconSpec::AccuracyCircle {
                    radius_meters: sample.accuracy_meters,
                    color: class.color(),
                },
            );
            if initial {
                map.set_center(sample.coordinate, zoom_for_accuracy(sample.accuracy_meters));
            }
        }
        {
            let mut advisories = self.advisories.borrow_mut();
            if class.needs_advisory() {
                advisories.publish(Advisory::LowAccuracy);
            } else {
                advisories.clear_if(Advisory::is_transient);
            }
        }

        let listener = self.listener.borrow().clone();
        if let Some(listener) = listener {
            listener(FixNotice { sample, initial });
        }
    }

    /// Run the watch until it is lost (`true`) or the run is over (`false`).
    /// A watch is lost when it times out or the host closes its stream.
    async fn watch(&self, token: &CancellationToken, generation: u64) -> bool {
        let options = options::watch(self.prefer_fast_first_fix);
        debug!("starting position watch: {options:?}");
        let Watch { handle, mut events } = self.provider.start_watch(options);
        let previous = self.session.borrow_mut().enter_watching(handle);
        if let Some(stale) = previous {
            self.provider.stop_watch(stale);
        }

        loop {
            let Some(delivery) = Self::until_cancelled(token, events.recv()).await else {
                return false;
            };
            let Some(event) = delivery else {
                if !self.is_live(generation) || !self.session.borrow().owns_watch(handle) {
                    return false;
                }
                warn!("position watch {handle:?} closed by the host; restarting");
                self.release_watch(handle);
                return true;
            };
            if !self.is_live(generation) || !self.session.borrow().owns_watch(handle) {
                debug!("ignoring delivery for stale watch {handle:?}");
                continue;
            }
            match event {
                Ok(sample) => {
                    self.consecutive_timeouts.set(0);
                    self.apply_fix(generation, sample, false);
                }
                Err(error) if error.code == PositionErrorCode::Timeout => {
                    info!("position watch {handle:?} timed out; restarting");
                    self.release_watch(handle);
                    return true;
                }
                Err(error) => warn!("position watch error: {error}"),
            }
        }
    }

    fn release_watch(&self, handle: WatchHandle) {
        let released = self.session.borrow_mut().watch_timed_out();
        self.provider.stop_watch(released.unwrap_or(handle));
    }

    async fn restart_pause(&self, token: &CancellationToken) -> bool {
        let timeouts = self.consecutive_timeouts.get();
        let delay = options::restart_delay(timeouts, &self.policy);
        self.consecutive_timeouts.set(timeouts.saturating_add(1));
        debug!("restarting acquisition in {delay:?}");
        self.wait(token, PendingTimer::RestartDelay { delay }, delay)
            .await
    }
}

async fn run(inner: Rc<TrackerInner>, token: CancellationToken, generation: u64) {
    loop {
        let Some(sample) = inner.acquire(&token).await else {
            return;
        };
        inner.apply_fix(generation, sample, true);
        if !inner.is_live(generation) {
            return;
        }

        if !inner.watch(&token, generation).await {
            return;
        }
        if !inner.restart_pause(&token).await {
            return;
        }
        if !inner.is_live(generation) || !inner.enabled.get() || !inner.begin_attempt(true) {
            return;
        }
    }
}

