//! Property tests for the core invariants.

use engram_core::memory::Confidence;
use engram_core::text;
use proptest::prelude::*;

proptest! {
    /// Confidence never leaves [0.3, 0.9] no matter the input or deltas.
    #[test]
    fn confidence_always_in_band(initial in -10.0f64..10.0, delta in -5.0f64..5.0) {
        let c = Confidence::new(initial).adjusted(delta);
        prop_assert!(c.value() >= Confidence::FLOOR);
        prop_assert!(c.value() <= Confidence::CEILING);
    }

    /// Jaccard is symmetric and bounded.
    #[test]
    fn jaccard_symmetric_and_bounded(a in "[a-z ]{0,64}", b in "[a-z ]{0,64}") {
        let ab = text::jaccard(&a, &b);
        let ba = text::jaccard(&b, &a);
        prop_assert!((ab - ba).abs() < 1e-12);
        prop_assert!((0.0..=1.0).contains(&ab));
    }

    /// Summaries never exceed 100 characters plus the ellipsis.
    #[test]
    fn summary_is_bounded(content in ".{0,400}") {
        let s = text::summarize(&content);
        prop_assert!(s.chars().count() <= 103);
    }
}
