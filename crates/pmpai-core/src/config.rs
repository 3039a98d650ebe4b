//! PMP.AI configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PmpConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

impl PmpConfig {
    /// Load config from the default path (~/.pmpai/config.toml), falling
    /// back to defaults when the file does not exist. `PMPAI_CONFIG`
    /// overrides the path.
    pub fn load() -> Result<Self> {
        let path = std::env::var("PMPAI_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_path());
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::error::PmpError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| crate::error::PmpError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.knowledge.overlap >= self.knowledge.chunk_size {
            return Err(crate::error::PmpError::Config(format!(
                "knowledge.overlap ({}) must be smaller than knowledge.chunk_size ({})",
                self.knowledge.overlap, self.knowledge.chunk_size
            )));
        }
        if self.embedding.dimension == 0 {
            return Err(crate::error::PmpError::Config(
                "embedding.dimension must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the PMP.AI home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".pmpai")
    }
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    7070
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Knowledge store and chunking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_overlap")]
    pub overlap: usize,
    /// Minimum usable extracted-text length for generic documents.
    #[serde(default = "default_min_text_len")]
    pub min_text_len: usize,
    /// Stricter floor for the AI-analysis intake path.
    #[serde(default = "default_analysis_min_text_len")]
    pub analysis_min_text_len: usize,
    /// How many sources ground a QA answer.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_db_path() -> String {
    "~/.pmpai/knowledge.db".into()
}
fn default_chunk_size() -> usize {
    1000
}
fn default_overlap() -> usize {
    200
}
fn default_min_text_len() -> usize {
    10
}
fn default_analysis_min_text_len() -> usize {
    100
}
fn default_top_k() -> usize {
    5
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            chunk_size: default_chunk_size(),
            overlap: default_overlap(),
            min_text_len: default_min_text_len(),
            analysis_min_text_len: default_analysis_min_text_len(),
            top_k: default_top_k(),
        }
    }
}

/// Lexical-boost weights layered on top of cosine similarity.
///
/// The constants are untuned; keep them in config rather than in code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_title_boost")]
    pub title_boost: f32,
    #[serde(default = "default_summary_boost")]
    pub summary_boost: f32,
    #[serde(default = "default_tag_boost")]
    pub tag_boost: f32,
}

fn default_title_boost() -> f32 {
    0.2
}
fn default_summary_boost() -> f32 {
    0.1
}
fn default_tag_boost() -> f32 {
    0.1
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            title_boost: default_title_boost(),
            summary_boost: default_summary_boost(),
            tag_boost: default_tag_boost(),
        }
    }
}

/// Embedding backend configuration.
///
/// `provider = "hash"` selects the deterministic stub; `"api"` selects the
/// OpenAI-compatible embeddings endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_provider")]
    pub provider: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub model: String,
    #[serde(default = "default_dimension")]
    pub dimension: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_embedding_provider() -> String {
    "hash".into()
}
fn default_dimension() -> usize {
    256
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            endpoint: String::new(),
            api_key: String::new(),
            model: String::new(),
            dimension: default_dimension(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Answer-composition backend configuration.
///
/// `provider = "template"` selects the deterministic stub; `"api"` selects
/// the OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_provider")]
    pub provider: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_llm_provider() -> String {
    "template".into()
}
fn default_llm_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.3
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            endpoint: String::new(),
            api_key: String::new(),
            model: default_llm_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
