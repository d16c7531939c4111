//! Deterministic mock gateways and builders for integration tests across
//! the workspace. The mock embedder hashes tokens into axis buckets, so
//! texts sharing words land near each other in the vector space — close
//! enough to exercise clustering and hybrid ranking without a model.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use engram_core::constants::EMBEDDING_DIMENSIONS;
use engram_core::errors::{EngramResult, GatewayError};
use engram_core::memory::{Confidence, MemoryRecord, MemoryType, StructuredMemory};
use engram_core::models::{ExtractedMemory, RecordDraft, StructurizeVerdict};
use engram_core::traits::{Embedder, Structurer};
use engram_core::vector::normalize;

/// A record draft with sensible test defaults.
pub fn record_draft(content: &str, memory_type: MemoryType, domain: &str) -> RecordDraft {
    RecordDraft {
        content: content.to_string(),
        structured: None,
        summary: engram_core::text::summarize(content),
        keywords: engram_core::text::keywords(content, &engram_core::text::Stopwords::default()),
        tags: Vec::new(),
        memory_type,
        domain: domain.to_string(),
        confidence: Confidence::default(),
        source: "user".to_string(),
        content_hash: MemoryRecord::compute_content_hash(content),
        promoted_at: None,
    }
}

/// A unit vector concentrated on one axis.
pub fn axis_vec(axis: usize) -> Vec<f32> {
    let mut v = vec![0.0f32; EMBEDDING_DIMENSIONS];
    v[axis % EMBEDDING_DIMENSIONS] = 1.0;
    v
}

/// A unit vector between two axes: cosine similarity `w` to `axis_vec(a)`
/// (for unit `w`² + rest² = 1).
pub fn blended_vec(a: usize, b: usize, w: f32) -> Vec<f32> {
    let mut v = vec![0.0f32; EMBEDDING_DIMENSIONS];
    v[a % EMBEDDING_DIMENSIONS] = w;
    v[b % EMBEDDING_DIMENSIONS] = (1.0 - w * w).max(0.0).sqrt();
    v
}

/// Deterministic embedder. Preset vectors win; otherwise tokens hash
/// into axis buckets and the sum is normalized. Flip `available` off to
/// simulate a dead service.
pub struct MockEmbedder {
    presets: Mutex<HashMap<String, Vec<f32>>>,
    available: std::sync::atomic::AtomicBool,
    calls: AtomicUsize,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self {
            presets: Mutex::new(HashMap::new()),
            available: std::sync::atomic::AtomicBool::new(true),
            calls: AtomicUsize::new(0),
        }
    }

    /// An embedder whose every call fails.
    pub fn unavailable() -> Self {
        let e = Self::new();
        e.available.store(false, Ordering::SeqCst);
        e
    }

    /// Pin the vector returned for an exact input text.
    pub fn preset(&self, text: &str, vector: Vec<f32>) {
        self.presets
            .lock()
            .unwrap()
            .insert(text.to_string(), vector);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The deterministic hash embedding, exposed so tests can compute
    /// expected neighbors.
    pub fn hash_embed(text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; EMBEDDING_DIMENSIONS];
        for token in text.split_whitespace() {
            let token = token.to_lowercase();
            let mut h: u64 = 1469598103934665603;
            for b in token.bytes() {
                h ^= b as u64;
                h = h.wrapping_mul(1099511628211);
            }
            v[(h % EMBEDDING_DIMENSIONS as u64) as usize] += 1.0;
        }
        normalize(&v)
    }

    fn embed_sync(&self, text: &str) -> Option<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.available.load(Ordering::SeqCst) {
            return None;
        }
        if let Some(preset) = self.presets.lock().unwrap().get(text) {
            return Some(preset.clone());
        }
        Some(Self::hash_embed(text))
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, text: &str) -> Option<Vec<f32>> {
        self.embed_sync(text)
    }

    async fn embed_query(&self, text: &str) -> Option<Vec<f32>> {
        self.embed_sync(text)
    }

    fn dimensions(&self) -> usize {
        EMBEDDING_DIMENSIONS
    }
}

/// What the mock structurer does per call.
pub enum StructurerScript {
    /// Build a minimal `<what>` record from the input text.
    Passthrough,
    /// Reject everything with this reason.
    Reject(String),
    /// Fail with a gateway error (service down).
    Fail,
    /// Return these memories from every `extract` call.
    Extract(Vec<ExtractedMemory>),
}

/// Scripted structurer.
pub struct MockStructurer {
    script: StructurerScript,
    merge_calls: AtomicUsize,
}

impl MockStructurer {
    pub fn passthrough() -> Self {
        Self {
            script: StructurerScript::Passthrough,
            merge_calls: AtomicUsize::new(0),
        }
    }

    pub fn rejecting(reason: &str) -> Self {
        Self {
            script: StructurerScript::Reject(reason.to_string()),
            merge_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            script: StructurerScript::Fail,
            merge_calls: AtomicUsize::new(0),
        }
    }

    pub fn extracting(memories: Vec<ExtractedMemory>) -> Self {
        Self {
            script: StructurerScript::Extract(memories),
            merge_calls: AtomicUsize::new(0),
        }
    }

    pub fn merge_call_count(&self) -> usize {
        self.merge_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Structurer for MockStructurer {
    async fn structurize(
        &self,
        text: &str,
        memory_type: MemoryType,
    ) -> EngramResult<StructurizeVerdict> {
        match &self.script {
            StructurerScript::Reject(reason) => Ok(StructurizeVerdict::Rejected {
                reason: reason.clone(),
            }),
            StructurerScript::Fail => Err(GatewayError::Unavailable {
                reason: "mock structurer down".to_string(),
            }
            .into()),
            _ => {
                let mut m = StructuredMemory::new(memory_type, "general");
                m.what = Some(text.to_string());
                Ok(StructurizeVerdict::Structured(m.render()))
            }
        }
    }

    async fn merge(&self, xmls: &[String], domain: &str) -> EngramResult<String> {
        self.merge_calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            StructurerScript::Fail => Err(GatewayError::Unavailable {
                reason: "mock structurer down".to_string(),
            }
            .into()),
            _ => {
                let mut m = StructuredMemory::new(MemoryType::Pattern, domain);
                m.what = Some(format!("merged {} records", xmls.len()));
                m.do_ = Some("apply the shared practice".to_string());
                Ok(m.render())
            }
        }
    }

    async fn extract(&self, _transcript: &str) -> EngramResult<Vec<ExtractedMemory>> {
        match &self.script {
            StructurerScript::Fail => Err(GatewayError::Unavailable {
                reason: "mock structurer down".to_string(),
            }
            .into()),
            StructurerScript::Extract(memories) => Ok(memories.clone()),
            _ => Ok(Vec::new()),
        }
    }
}
