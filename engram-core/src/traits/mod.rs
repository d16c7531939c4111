pub mod embedder;
pub mod store;
pub mod structurer;

pub use embedder::{build_embedding_input, Embedder};
pub use store::MemoryStore;
pub use structurer::Structurer;
