//! Engine configuration. Every section has code defaults so an absent or
//! partial TOML file still yields a working config.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::errors::{ConfigError, EngramResult};

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngramConfig {
    pub paths: PathsConfig,
    pub server: ServerConfig,
    pub embedder: EmbedderConfig,
    pub llm: LlmConfig,
    pub search: SearchConfig,
    pub cluster: ClusterConfig,
    pub text: TextConfig,
}

/// Filesystem layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding `memory.db`.
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    /// Scratch directory for process-id files.
    pub scratch_dir: PathBuf,
}

/// The loopback search service this engine exposes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

/// The external embedding service the gateway consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedderConfig {
    pub host: String,
    pub port: u16,
    pub model_id: String,
    /// Must stay 1024 for `memory.db` compatibility.
    pub dimensions: usize,
    pub timeout_ms: u64,
    pub query_timeout_ms: u64,
}

/// The external LLM sidecar the structurer consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub host: String,
    pub port: u16,
    pub endpoint: String,
    pub api_key: String,
    pub deployment: String,
    pub api_version: String,
    pub timeout_ms: u64,
    pub structurize_timeout_ms: u64,
    pub merge_timeout_ms: u64,
    pub session_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub max_results: usize,
    pub min_similarity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    pub similarity_threshold: f64,
    pub maturity_count: usize,
    pub maturity_confidence: f64,
}

/// Stopword extensions; the built-in sets stay in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub extra_stopwords: Vec<String>,
    pub extra_cjk_stopwords: Vec<String>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            log_dir: PathBuf::from("./logs"),
            scratch_dir: PathBuf::from("./run"),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 23811 }
    }
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 23812,
            model_id: "bge-m3".to_string(),
            dimensions: constants::EMBEDDING_DIMENSIONS,
            timeout_ms: 800,
            query_timeout_ms: 1000,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 23813,
            endpoint: String::new(),
            api_key: String::new(),
            deployment: String::new(),
            api_version: String::new(),
            timeout_ms: 5_000,
            structurize_timeout_ms: 15_000,
            merge_timeout_ms: 20_000,
            session_timeout_ms: 30_000,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 3,
            min_similarity: 0.6,
        }
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: constants::CLUSTER_SIM_THRESHOLD,
            maturity_count: constants::CLUSTER_MATURITY_COUNT,
            maturity_confidence: constants::CLUSTER_MATURITY_CONFIDENCE,
        }
    }
}

impl EngramConfig {
    /// Load from a TOML file. Missing sections fall back to defaults.
    pub fn load(path: &Path) -> EngramResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config: Self = toml::from_str(&raw).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        Ok(config)
    }

    /// Path of the database file inside the data directory.
    pub fn db_path(&self) -> PathBuf {
        self.paths.data_dir.join("memory.db")
    }
}
