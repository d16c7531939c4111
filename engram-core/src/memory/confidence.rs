use serde::{Deserialize, Serialize};
use std::fmt;

/// Confidence score clamped to [0.3, 0.9].
/// Expresses the engine's belief that a record is useful; adjusted by
/// validation feedback and duplicate saves. The clamp is re-applied on
/// every mutation, so values never leave the band at rest.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Confidence(f64);

impl Confidence {
    /// Lower bound — records never fall below this.
    pub const FLOOR: f64 = 0.3;
    /// Upper bound — records never rise above this.
    pub const CEILING: f64 = 0.9;
    /// Confidence assigned when the caller supplies none.
    pub const DEFAULT: f64 = 0.5;

    /// Create a new Confidence, clamping to [0.3, 0.9].
    pub fn new(value: f64) -> Self {
        Self(value.clamp(Self::FLOOR, Self::CEILING))
    }

    /// Get the raw f64 value.
    pub fn value(self) -> f64 {
        self.0
    }

    /// Apply a signed delta, re-clamping the result.
    pub fn adjusted(self, delta: f64) -> Self {
        Self::new(self.0 + delta)
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

impl From<f64> for Confidence {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Confidence> for f64 {
    fn from(c: Confidence) -> Self {
        c.0
    }
}
