//! Shared result and input models crossing crate boundaries.

mod drafts;
mod outcomes;
mod search;
mod stats;

pub use drafts::{ClusterDraft, ClusterPatch, RecordDraft, RecordPatch};
pub use outcomes::{ClusterJoin, ExtractedMemory, SaveOutcome, StructurizeVerdict};
pub use search::{SearchFilters, SearchHit};
pub use stats::MemoryStats;
