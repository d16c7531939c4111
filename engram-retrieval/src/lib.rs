//! # engram-retrieval
//!
//! The hybrid ranker: lexical candidates from the FTS layer merged with
//! dense candidates from the vector scan, filtered, and scored as
//! `0.7 · vector_similarity + 0.3 · min(bm25 / 10, 1)`. When the
//! embedding service is unavailable (or the caller wants zero model
//! load), ranking degrades to the lexical score alone.

pub mod engine;

pub use engine::Retriever;
