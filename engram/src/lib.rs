//! # engram
//!
//! Facade over the memory engine: wires configuration into the storage
//! engine and both gateways, exposes the tool operations (search, save,
//! validate, stats) as a library API, and hosts the loopback search
//! service the request router talks to.

pub mod engine;
pub mod server;

pub use engine::MemoryEngine;
pub use server::serve;
