//! # engram-embeddings
//!
//! Thin gateway to the external embedding service: one JSON request line
//! out, one JSON response line back, a hard per-call deadline, and
//! unit-norm/dimension validation on the result. Failures come back as
//! `None`; the engine proceeds without a vector and never retries here.

pub mod client;
pub(crate) mod wire;

pub use client::EmbedderClient;
pub use engram_core::traits::embedder::build_embedding_input;
