//! # engram-core
//!
//! Foundation crate for the Engram memory system.
//! Defines all types, traits, errors, config, constants, and the text
//! utilities shared by the storage and curation layers.
//! Every other crate in the workspace depends on this.

pub mod cluster;
pub mod config;
pub mod constants;
pub mod errors;
pub mod memory;
pub mod models;
pub mod text;
pub mod traits;
pub mod vector;

// Re-export the most commonly used types at the crate root.
pub use cluster::{Cluster, ClusterStatus};
pub use config::EngramConfig;
pub use errors::{EngramError, EngramResult};
pub use memory::{Confidence, MemoryRecord, MemoryType, StructuredMemory};
