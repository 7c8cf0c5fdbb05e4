//! Property tests for `reqretry`'s backoff strategies.
//!
//! Invariants tested:
//! - `ExponentialBackoff` never produces a delay smaller than the previous
//!   attempt's delay, and never exceeds its configured cap.
//! - `ExponentialRandomBackoff` always stays within its jitter bounds of the
//!   underlying exponential delay it wraps.

use std::time::Duration;

use proptest::prelude::*;
use reqretry::{ExponentialBackoff, ExponentialRandomBackoff, IntervalFunction};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Delays are non-decreasing in the attempt number and never exceed the cap.
    #[test]
    fn exponential_backoff_is_monotonic_and_capped(
        base_ms in 1u64..500,
        multiplier in 1.0f64..4.0,
        cap_ms in 500u64..60_000,
        attempts in 1u32..8,
    ) {
        let backoff = ExponentialBackoff::new(Duration::from_millis(base_ms))
            .multiplier(multiplier)
            .max_interval(Duration::from_millis(cap_ms));

        let mut previous = Duration::ZERO;
        for attempt in 1..=attempts {
            let delay = backoff.next_interval(attempt);
            prop_assert!(delay <= Duration::from_millis(cap_ms));
            prop_assert!(delay >= previous);
            previous = delay;
        }
    }

    /// Jittered delays always fall within `base * (1 - factor)..=base * (1 + factor)`.
    #[test]
    fn jitter_stays_within_configured_bounds(
        base_ms in 1u64..500,
        randomization_factor in 0.0f64..1.0,
        attempt in 1u32..8,
    ) {
        let base = ExponentialBackoff::new(Duration::from_millis(base_ms));
        let jittered = ExponentialRandomBackoff::new(base, randomization_factor);

        let nominal = base.next_interval(attempt).as_secs_f64();
        let lower = (nominal * (1.0 - randomization_factor)).max(0.0);
        let upper = nominal * (1.0 + randomization_factor);
        let got = jittered.next_interval(attempt).as_secs_f64();

        prop_assert!(got >= lower - 1e-9 && got <= upper + 1e-9, "got {got}, expected [{lower}, {upper}]");
    }
}
