//! # engram-llm
//!
//! Structurer gateway to the external LLM sidecar. Three operations,
//! each with its own deadline: free text → typed XML (or a reject
//! verdict), record merge for cluster aggregation, and transcript
//! extraction. Failures are typed; callers apply the documented
//! fallbacks (vectorless save, concatenation merge, skip).

pub mod client;
pub(crate) mod wire;

pub use client::StructurerClient;
