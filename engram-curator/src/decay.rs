//! Time-decay weight applied to a record's rank contribution.
//!
//! `decay(created_at, type) = max(min_weight, 0.5^(age_days / half_life))`
//! with per-type parameters from the core table; types without an entry
//! (skills, permanent records) never decay.

use chrono::{DateTime, Utc};

use engram_core::memory::MemoryType;

pub fn decay_weight(created_at: DateTime<Utc>, memory_type: MemoryType, now: DateTime<Utc>) -> f64 {
    let Some(params) = memory_type.decay_params() else {
        return 1.0;
    };
    let age_days = (now - created_at).num_seconds().max(0) as f64 / 86_400.0;
    let weight = 0.5f64.powf(age_days / params.half_life_days);
    weight.max(params.min_weight)
}
