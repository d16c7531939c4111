pub mod confidence;
pub mod record;
pub mod structured;
pub mod types;

pub use confidence::Confidence;
pub use record::MemoryRecord;
pub use structured::StructuredMemory;
pub use types::{DecayParams, MemoryType, StructureField};
