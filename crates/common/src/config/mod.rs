//! Configuration management for the FabLore query engine
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with FABLORE__)
//! - Configuration files (config/default, config/{env}, config/local)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main engine configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Context assembly configuration
    #[serde(default)]
    pub context: ContextConfig,

    /// Generative backend configuration
    #[serde(default)]
    pub backend: BackendConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrievalConfig {
    /// Minimum relevance score for a passage to survive filtering
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,

    /// Source cap applied when the caller does not specify one
    #[serde(default = "default_max_sources")]
    pub default_max_sources: usize,

    /// Elevated source cap used by timeline mining
    #[serde(default = "default_timeline_max_sources")]
    pub timeline_max_sources: usize,

    /// Collections searched when the caller does not name any
    #[serde(default = "default_collections")]
    pub default_collections: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContextConfig {
    /// Character budget for the assembled context string
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,

    /// Chunk size used by the upstream text splitter
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Chunk overlap used by the upstream text splitter
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Backend provider: openai, none
    #[serde(default = "default_backend_provider")]
    pub provider: String,

    /// API key for the generative backend
    pub api_key: Option<String>,

    /// API base URL (for OpenAI-compatible endpoints)
    pub api_base: Option<String>,

    /// Model to use
    #[serde(default = "default_backend_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum output tokens per completion
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Completion timeout in seconds
    #[serde(default = "default_backend_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Service name for tracing
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_similarity_threshold() -> f32 { 0.7 }
fn default_max_sources() -> usize { 10 }
fn default_timeline_max_sources() -> usize { 20 }
fn default_collections() -> Vec<String> {
    [
        "documents",
        "research_papers",
        "news_articles",
        "patents",
        "historical_data",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_max_context_chars() -> usize { 4000 }
fn default_chunk_size() -> usize { 1000 }
fn default_chunk_overlap() -> usize { 200 }
fn default_backend_provider() -> String { "openai".to_string() }
fn default_backend_model() -> String { crate::DEFAULT_BACKEND_MODEL.to_string() }
fn default_temperature() -> f32 { 0.1 }
fn default_max_output_tokens() -> u32 { 1500 }
fn default_backend_timeout() -> u64 { 30 }
fn default_log_level() -> String { "info".to_string() }
fn default_service_name() -> String { "fablore".to_string() }

impl EngineConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("FABLORE_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))
            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // Load local overrides
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables with FABLORE__ prefix
            // e.g., FABLORE__RETRIEVAL__SIMILARITY_THRESHOLD=0.6
            .add_source(
                Environment::with_prefix("FABLORE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("FABLORE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl BackendConfig {
    /// Get the completion timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retrieval: RetrievalConfig::default(),
            context: ContextConfig::default(),
            backend: BackendConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            default_max_sources: default_max_sources(),
            timeline_max_sources: default_timeline_max_sources(),
            default_collections: default_collections(),
        }
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_context_chars: default_max_context_chars(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: default_backend_provider(),
            api_key: None,
            api_base: None,
            model: default_backend_model(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: default_backend_timeout(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            service_name: default_service_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.retrieval.similarity_threshold, 0.7);
        assert_eq!(config.retrieval.default_max_sources, 10);
        assert_eq!(config.context.max_context_chars, 4000);
        assert_eq!(config.backend.model, "gpt-4-turbo-preview");
        assert_eq!(config.backend.max_output_tokens, 1500);
    }

    #[test]
    fn test_default_collections() {
        let config = RetrievalConfig::default();
        assert_eq!(config.default_collections.len(), 5);
        assert_eq!(config.default_collections[0], "documents");
        assert_eq!(config.default_collections[4], "historical_data");
    }

    #[test]
    fn test_backend_timeout() {
        let config = BackendConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }
}
