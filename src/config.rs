//! TOML configuration for docqa.
//!
//! Every section has defaults so a minimal file (or [`Config::default`])
//! is enough to run. [`load_config`] parses and validates; the resulting
//! value is passed explicitly to each component and never mutated.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::retrieve::ScoreOrder;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub collection: CollectionConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub ingestion: IngestionConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub uploads: UploadsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/docqa.sqlite"),
        }
    }
}

/// How the SQLite collection reports scores.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScoreMetric {
    /// Cosine similarity; larger means more similar.
    #[default]
    CosineSimilarity,
    /// `1 - cosine similarity`; smaller means more similar.
    CosineDistance,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CollectionConfig {
    #[serde(default = "default_collection_name")]
    pub name: String,
    #[serde(default)]
    pub metric: ScoreMetric,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            name: default_collection_name(),
            metric: ScoreMetric::default(),
        }
    }
}

fn default_collection_name() -> String {
    "documents".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
        }
    }
}

fn default_max_chars() -> usize {
    1000
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestionConfig {
    #[serde(default = "default_ingest_batch_size")]
    pub batch_size: usize,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            batch_size: default_ingest_batch_size(),
        }
    }
}

fn default_ingest_batch_size() -> usize {
    100
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_n_results")]
    pub n_results: usize,
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
    #[serde(default)]
    pub score_order: ScoreOrder,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            n_results: default_n_results(),
            confidence_threshold: default_confidence_threshold(),
            score_order: ScoreOrder::default(),
        }
    }
}

fn default_n_results() -> usize {
    2
}
fn default_confidence_threshold() -> f64 {
    0.3
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_dims")]
    pub dims: usize,
    /// Base URL for the Ollama provider.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_embedding_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_embedding_model(),
            dims: default_dims(),
            url: None,
            batch_size: default_embedding_batch_size(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_provider() -> String {
    "openai".to_string()
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}
fn default_dims() -> usize {
    1536
}
fn default_embedding_batch_size() -> usize {
    64
}
fn default_max_retries() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

fn default_llm_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}
fn default_llm_model() -> String {
    "llama-3.1-8b-instant".to_string()
}
fn default_api_key_env() -> String {
    "GROQ_API_KEY".to_string()
}
fn default_temperature() -> f32 {
    0.2
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_top_p() -> f32 {
    1.0
}
fn default_llm_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    pub path: PathBuf,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/qa_history.json"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadsConfig {
    pub folder: PathBuf,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("./uploads"),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

/// Parse and validate configuration from a TOML string.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.chunking.max_chars == 0 {
        bail!("chunking.max_chars must be > 0");
    }

    if config.ingestion.batch_size == 0 {
        bail!("ingestion.batch_size must be > 0");
    }

    if config.retrieval.n_results < 1 {
        bail!("retrieval.n_results must be >= 1");
    }

    if !config.retrieval.confidence_threshold.is_finite() {
        bail!("retrieval.confidence_threshold must be a finite number");
    }

    match config.embedding.provider.as_str() {
        "openai" | "ollama" => {}
        other => bail!(
            "Unknown embedding provider: '{}'. Must be openai or ollama.",
            other
        ),
    }

    if config.embedding.dims == 0 {
        bail!("embedding.dims must be > 0");
    }

    if config.embedding.batch_size == 0 {
        bail!("embedding.batch_size must be > 0");
    }

    if !(0.0..=2.0).contains(&config.llm.temperature) {
        bail!("llm.temperature must be in [0.0, 2.0]");
    }

    if !(config.llm.top_p > 0.0 && config.llm.top_p <= 1.0) {
        bail!("llm.top_p must be in (0.0, 1.0]");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.chunking.max_chars, 1000);
        assert_eq!(config.ingestion.batch_size, 100);
        assert_eq!(config.retrieval.n_results, 2);
        assert_eq!(config.retrieval.score_order, ScoreOrder::HigherIsBetter);
        assert_eq!(config.collection.metric, ScoreMetric::CosineSimilarity);
        assert_eq!(config.llm.api_key_env, "GROQ_API_KEY");
    }

    #[test]
    fn sections_override_defaults() {
        let config = parse_config(
            r#"
            [chunking]
            max_chars = 250

            [retrieval]
            n_results = 5
            confidence_threshold = 0.75
            score_order = "lower_is_better"

            [collection]
            metric = "cosine_distance"

            [embedding]
            provider = "ollama"
            model = "nomic-embed-text"
            dims = 768
            url = "http://localhost:11434"
            "#,
        )
        .unwrap();
        assert_eq!(config.chunking.max_chars, 250);
        assert_eq!(config.retrieval.n_results, 5);
        assert_eq!(config.retrieval.confidence_threshold, 0.75);
        assert_eq!(config.retrieval.score_order, ScoreOrder::LowerIsBetter);
        assert_eq!(config.collection.metric, ScoreMetric::CosineDistance);
        assert_eq!(config.embedding.provider, "ollama");
        assert_eq!(config.embedding.dims, 768);
    }

    #[test]
    fn example_config_parses() {
        let config = parse_config(include_str!("../config/docqa.example.toml")).unwrap();
        assert_eq!(config.collection.name, "documents");
        assert_eq!(config.llm.model, "llama-3.1-8b-instant");
        assert_eq!(config.embedding.dims, 1536);
    }

    #[test]
    fn zero_sizes_are_rejected() {
        assert!(parse_config("[chunking]\nmax_chars = 0").is_err());
        assert!(parse_config("[ingestion]\nbatch_size = 0").is_err());
        assert!(parse_config("[retrieval]\nn_results = 0").is_err());
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let err = parse_config("[embedding]\nprovider = \"magic\"").unwrap_err();
        assert!(err.to_string().contains("Unknown embedding provider"));
    }

    #[test]
    fn out_of_range_sampling_is_rejected() {
        assert!(parse_config("[llm]\ntemperature = 3.5").is_err());
        assert!(parse_config("[llm]\ntop_p = 0.0").is_err());
    }

    #[test]
    fn load_config_reports_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
