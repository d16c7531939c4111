//! # engram-curator
//!
//! The write side of the memory engine: the save pipeline (dedup →
//! structuring → insert → embed → cluster join), online and batch
//! clustering with maturity promotion, cluster merge with an LLM
//! aggregation path and a concatenation fallback, and the confidence /
//! access / time-decay bookkeeping.

pub mod clustering;
pub mod decay;
pub mod engine;
pub mod merge;

pub use clustering::{AutoClusterOptions, ClusterSummary};
pub use decay::decay_weight;
pub use engine::{Curator, SaveOptions};
pub use merge::MergeOutcome;
