//! Position request options for each acquisition phase.

use std::time::Duration;

use wayfinder_core::PositionOptions;

use crate::AcquisitionPolicy;

/// Options for the first one-shot request.
///
/// A fast first fix accepts a coarse, cached position; otherwise the request
/// asks for GPS accuracy and a fresher cache.
#[must_use]
pub const fn initial(prefer_fast_first_fix: bool) -> PositionOptions {
    if prefer_fast_first_fix {
        PositionOptions {
            high_accuracy: false,
            max_cache_age: Duration::from_secs(60),
            timeout: Duration::from_secs(15),
        }
    } else {
        PositionOptions {
            high_accuracy: true,
            max_cache_age: Duration::from_secs(30),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Options for the single fallback after the initial request fails: the
/// opposite accuracy preference and no cached fixes.
#[must_use]
pub const fn fallback(initial: PositionOptions, policy: &AcquisitionPolicy) -> PositionOptions {
    PositionOptions {
        high_accuracy: !initial.high_accuracy,
        max_cache_age: Duration::ZERO,
        timeout: policy.fallback_timeout,
    }
}

/// Options for retry `attempt` (1-based). The timeout grows with every
/// attempt and high accuracy is requested from the second one on.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use wayfinder_nav::{AcquisitionPolicy, options};
///
/// let third = options::retry(3, &AcquisitionPolicy::default());
/// assert_eq!(third.timeout, Duration::from_secs(35));
/// assert!(third.high_accuracy);
/// ```
#[must_use]
pub fn retry(attempt: u32, policy: &AcquisitionPolicy) -> PositionOptions {
    PositionOptions {
        high_accuracy: attempt > 1,
        max_cache_age: Duration::ZERO,
        timeout: policy
            .retry_timeout_base
            .saturating_add(policy.retry_timeout_step.saturating_mul(attempt)),
    }
}

/// Options for the continuous watch.
#[must_use]
pub const fn watch(prefer_fast_first_fix: bool) -> PositionOptions {
    if prefer_fast_first_fix {
        PositionOptions {
            high_accuracy: true,
            max_cache_age: Duration::from_secs(10),
            timeout: Duration::from_secs(20),
        }
    } else {
        PositionOptions {
            high_accuracy: true,
            max_cache_age: Duration::from_secs(15),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Pause before restarting after `consecutive_timeouts` earlier watch
/// timeouts with no watch sample in between. Doubles from
/// [`AcquisitionPolicy::restart_delay`] up to
/// [`AcquisitionPolicy::restart_delay_cap`].
#[must_use]
pub fn restart_delay(consecutive_timeouts: u32, policy: &AcquisitionPolicy) -> Duration {
    let factor = 1_u32.checked_shl(consecutive_timeouts).unwrap_or(u32::MAX);
    policy
        .restart_delay
        .saturating_mul(factor)
        .min(policy.restart_delay_cap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(true, false, 60, 15)]
    #[case(false, true, 30, 10)]
    fn initial_options_follow_client(
        #[case] fast: bool,
        #[case] high_accuracy: bool,
        #[case] cache_secs: u64,
        #[case] timeout_secs: u64,
    ) {
        let options = initial(fast);
        assert_eq!(options.high_accuracy, high_accuracy);
        assert_eq!(options.max_cache_age, Duration::from_secs(cache_secs));
        assert_eq!(options.timeout, Duration::from_secs(timeout_secs));
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    fn fallback_inverts_accuracy(#[case] fast: bool) {
        let first = initial(fast);
        let second = fallback(first, &AcquisitionPolicy::default());
        assert_eq!(second.high_accuracy, !first.high_accuracy);
        assert_eq!(second.max_cache_age, Duration::ZERO);
        assert_eq!(second.timeout, Duration::from_secs(30));
    }

    #[rstest]
    #[case(1, false, 25)]
    #[case(2, true, 30)]
    #[case(3, true, 35)]
    fn retries_grow_their_timeout(
        #[case] attempt: u32,
        #[case] high_accuracy: bool,
        #[case] timeout_secs: u64,
    ) {
        let options = retry(attempt, &AcquisitionPolicy::default());
        assert_eq!(options.high_accuracy, high_accuracy);
        assert_eq!(options.max_cache_age, Duration::ZERO);
        assert_eq!(options.timeout, Duration::from_secs(timeout_secs));
    }

    #[rstest]
    #[case(true, 10, 20)]
    #[case(false, 15, 30)]
    fn watch_always_wants_accuracy(
        #[case] fast: bool,
        #[case] cache_secs: u64,
        #[case] timeout_secs: u64,
    ) {
        let options = watch(fast);
        assert!(options.high_accuracy);
        assert_eq!(options.max_cache_age, Duration::from_secs(cache_secs));
        assert_eq!(options.timeout, Duration::from_secs(timeout_secs));
    }

    #[rstest]
    #[case(0, 1_000)]
    #[case(1, 2_000)]
    #[case(3, 8_000)]
    #[case(5, 30_000)]
    #[case(40, 30_000)]
    fn restart_delay_doubles_up_to_the_cap(#[case] timeouts: u32, #[case] millis: u64) {
        assert_eq!(
            restart_delay(timeouts, &AcquisitionPolicy::default()),
            Duration::from_millis(millis)
        );
    }
}
