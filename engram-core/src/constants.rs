/// Engram system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Dimensionality of every stored embedding. The database layout depends
/// on this value; changing it requires a full vector rebuild.
pub const EMBEDDING_DIMENSIONS: usize = 1024;

/// How many recent records per (type, domain) bucket the dedup check scans.
pub const DEDUP_WINDOW: usize = 10;

/// Word-level Jaccard similarity at or above which a save is a duplicate.
pub const DEDUP_SIMILARITY: f64 = 0.95;

/// Confidence bump applied when a duplicate save revalidates a record.
pub const DEDUP_CONFIDENCE_BUMP: f64 = 0.05;

/// Cosine similarity required for a record to join an existing cluster.
pub const CLUSTER_SIM_THRESHOLD: f64 = 0.70;

/// Member count at which a growing cluster may become mature.
pub const CLUSTER_MATURITY_COUNT: usize = 5;

/// Average member confidence required for maturity.
pub const CLUSTER_MATURITY_CONFIDENCE: f64 = 0.65;

/// Maximum number of unclustered records one batch clustering pass takes.
pub const AUTO_CLUSTER_BATCH_LIMIT: usize = 100;

/// Minimum candidate size kept by batch clustering.
pub const AUTO_CLUSTER_MIN_SIZE: usize = 2;

/// Weight of the dense-vector similarity in the hybrid score.
pub const VECTOR_WEIGHT: f64 = 0.7;

/// Weight of the lexical (BM25) term in the hybrid score.
pub const LEXICAL_WEIGHT: f64 = 0.3;

/// BM25 scores are divided by this and capped at 1.0 before weighting.
pub const BM25_NORMALIZATION: f64 = 10.0;

/// Score contributed by each matched CJK n-gram in lexical search.
pub const CJK_NGRAM_SCORE: f64 = 0.5;

/// Score of the whole-query substring fallback in lexical search.
pub const SUBSTRING_FALLBACK_SCORE: f64 = 0.3;

/// Maximum summary length in characters (excluding the `...` suffix).
pub const SUMMARY_MAX_CHARS: usize = 100;

/// Number of keyword tokens extracted per record.
pub const KEYWORD_LIMIT: usize = 10;

/// Confidence delta for a positive validation event.
pub const VALIDATE_REWARD: f64 = 0.1;

/// Confidence delta for a negative validation event.
pub const VALIDATE_PENALTY: f64 = 0.05;

/// Confidence assigned to an LLM-merged aggregate record.
pub const MERGE_CONFIDENCE: f64 = 0.9;

/// Confidence assigned to the concatenation fallback aggregate.
pub const MERGE_FALLBACK_CONFIDENCE: f64 = 0.85;

/// Maximum number of records extracted from one transcript.
pub const EXTRACT_LIMIT: usize = 3;
