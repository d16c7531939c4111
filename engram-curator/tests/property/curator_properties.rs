//! Property tests over the decay table and validation walks.

use chrono::{Duration, Utc};
use engram_core::memory::{Confidence, MemoryType};
use engram_curator::decay_weight;
use proptest::prelude::*;

fn any_type() -> impl Strategy<Value = MemoryType> {
    prop::sample::select(MemoryType::ALL.to_vec())
}

proptest! {
    /// Decay stays within [min_weight, 1] for any age.
    #[test]
    fn decay_is_bounded(memory_type in any_type(), age_days in 0i64..20_000) {
        let now = Utc::now();
        let created = now - Duration::days(age_days);
        let weight = decay_weight(created, memory_type, now);

        let floor = memory_type
            .decay_params()
            .map(|p| p.min_weight)
            .unwrap_or(1.0);
        prop_assert!(weight >= floor - 1e-12);
        prop_assert!(weight <= 1.0 + 1e-12);
    }

    /// Decay is monotone non-increasing in age.
    #[test]
    fn decay_never_increases_with_age(memory_type in any_type(), age in 0i64..5_000, extra in 0i64..5_000) {
        let now = Utc::now();
        let younger = decay_weight(now - Duration::days(age), memory_type, now);
        let older = decay_weight(now - Duration::days(age + extra), memory_type, now);
        prop_assert!(older <= younger + 1e-12);
    }

    /// Any sequence of validation deltas keeps confidence in the band.
    #[test]
    fn validation_walk_stays_in_band(initial in 0.0f64..1.0, verdicts in prop::collection::vec(any::<bool>(), 0..64)) {
        let mut confidence = Confidence::new(initial);
        for is_valid in verdicts {
            let delta = if is_valid { 0.1 } else { -0.05 };
            confidence = confidence.adjusted(delta);
            prop_assert!(confidence.value() >= 0.3);
            prop_assert!(confidence.value() <= 0.9);
        }
    }
}
