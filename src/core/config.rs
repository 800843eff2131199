//! Configuration management for tessera.
//!
//! This module handles loading configuration from TOML files and
//! environment variables, with sensible defaults for all settings.

use crate::core::error::{Result, TesseraError};
use crate::core::types::ChunkPolicy;
use crate::core::xdg::XdgDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub indexing: IndexingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Indexing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexingConfig {
    /// Default token budget per chunk
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Default token overlap carried between consecutive chunks
    #[serde(default = "default_overlap_tokens")]
    pub overlap_tokens: usize,

    /// Hard character ceiling per chunk
    #[serde(default = "default_hard_max_chars")]
    pub hard_max_chars: usize,

    /// Characters inspected when choosing a chunk policy
    #[serde(default = "default_sample_chars")]
    pub sample_chars: usize,

    /// Maximum file size in MB (skip larger files)
    #[serde(default = "default_max_file_size")]
    pub max_file_size_mb: usize,

    /// File patterns to include (glob syntax)
    #[serde(default = "default_include_patterns")]
    pub include_patterns: Vec<String>,

    /// File patterns to exclude (glob syntax)
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,
}

/// Retrieval configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrievalConfig {
    /// Results returned when a request does not set `top_k`
    #[serde(default = "default_k")]
    pub default_k: usize,

    /// Upper bound on results per request
    #[serde(default = "default_max_k")]
    pub max_k: usize,

    /// Maximum question length in characters
    #[serde(default = "default_max_query_length")]
    pub max_query_length: usize,

    /// Weight of the question vector when blending in memory
    #[serde(default = "default_memory_blend_alpha")]
    pub memory_blend_alpha: f32,

    /// Score added to chunks whose path matches the question's path hint
    #[serde(default = "default_path_hint_boost")]
    pub path_hint_boost: f32,
}

/// Conversation memory configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MemoryConfig {
    /// Turns kept per conversation (oldest evicted first)
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory holding index snapshots
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

// Default value functions
fn default_max_tokens() -> usize {
    512
}

fn default_overlap_tokens() -> usize {
    64
}

fn default_hard_max_chars() -> usize {
    4000
}

fn default_sample_chars() -> usize {
    8000
}

fn default_max_file_size() -> usize {
    10
}

fn default_k() -> usize {
    8
}

fn default_max_k() -> usize {
    100
}

fn default_max_query_length() -> usize {
    2000
}

fn default_memory_blend_alpha() -> f32 {
    0.7
}

fn default_path_hint_boost() -> f32 {
    0.05
}

fn default_max_turns() -> usize {
    10
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_include_patterns() -> Vec<String> {
    [
        // Code
        "*.rs", "*.cs", "*.fs", "*.vb", "*.py", "*.js", "*.jsx", "*.ts", "*.tsx", "*.go",
        "*.java", "*.kt", "*.c", "*.h", "*.cpp", "*.hpp", "*.rb", "*.php", "*.swift",
        "*.scala", "*.sh", "*.ps1", "*.sql",
        // Config and manifests
        "*.toml", "*.json", "*.yaml", "*.yml", "*.xml", "*.csproj", "*.fsproj", "*.props",
        "*.sln", "*.ini", "*.cfg",
        // Docs and extensionless well-known files
        "*.md", "*.txt", "*.rst", "Makefile", "Dockerfile", "README*", "LICENSE*",
        "NOTICE*",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_exclude_patterns() -> Vec<String> {
    [
        // Build artifacts and dependencies
        "**/node_modules/**",
        "**/target/**",
        "**/vendor/**",
        "**/.git/**",
        "**/bin/**",
        "**/obj/**",
        "**/build/**",
        "**/dist/**",
        "**/__pycache__/**",
        // Lock files are large and carry no meaning worth retrieving
        "**/*.lock",
        "**/package-lock.json",
        // Minified bundles
        "**/*.min.js",
        "**/*.min.css",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            overlap_tokens: default_overlap_tokens(),
            hard_max_chars: default_hard_max_chars(),
            sample_chars: default_sample_chars(),
            max_file_size_mb: default_max_file_size(),
            include_patterns: default_include_patterns(),
            exclude_patterns: default_exclude_patterns(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_k: default_k(),
            max_k: default_max_k(),
            max_query_length: default_max_query_length(),
            memory_blend_alpha: default_memory_blend_alpha(),
            path_hint_boost: default_path_hint_boost(),
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Parse an env var into `target`, ignoring unset or malformed values
fn override_from_env<T: std::str::FromStr>(name: &str, target: &mut T) {
    if let Ok(raw) = env::var(name) {
        match raw.parse() {
            Ok(value) => *target = value,
            Err(_) => tracing::warn!("Ignoring unparseable {}={:?}", name, raw),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| TesseraError::ConfigError(format!("Failed to read config file: {e}")))?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load config with priority: env vars > TOML > defaults
    pub fn load() -> Result<Self> {
        let xdg = XdgDirs::new();
        Self::load_with_xdg(&xdg)
    }

    /// Load config with explicit XDG directories
    ///
    /// Priority order:
    /// 1. TESSERA_CONFIG env var
    /// 2. XDG config file (~/.config/tessera/config.toml)
    /// 3. ./tessera.toml
    /// 4. Defaults
    pub fn load_with_xdg(xdg: &XdgDirs) -> Result<Self> {
        let mut config = if let Ok(config_path) = env::var("TESSERA_CONFIG") {
            Self::from_file(config_path)?
        } else {
            let xdg_config = xdg.config_file();
            if xdg_config.exists() {
                Self::from_file(xdg_config)?
            } else if Path::new("tessera.toml").exists() {
                Self::from_file("tessera.toml")?
            } else {
                Self::default()
            }
        };

        // Snapshots live under the XDG data dir unless set explicitly
        if env::var("TESSERA_DATA_DIR").is_err() && config.storage.data_dir == default_data_dir()
        {
            config.storage.data_dir = xdg.data_dir.clone();
        }

        config.merge_env();
        config.validate()?;

        Ok(config)
    }

    /// Merge configuration with environment variables
    pub fn merge_env(&mut self) {
        override_from_env("TESSERA_MAX_TOKENS", &mut self.indexing.max_tokens);
        override_from_env("TESSERA_OVERLAP_TOKENS", &mut self.indexing.overlap_tokens);
        override_from_env("TESSERA_HARD_MAX_CHARS", &mut self.indexing.hard_max_chars);
        override_from_env("TESSERA_SAMPLE_CHARS", &mut self.indexing.sample_chars);
        override_from_env(
            "TESSERA_MAX_FILE_SIZE_MB",
            &mut self.indexing.max_file_size_mb,
        );

        override_from_env("TESSERA_DEFAULT_K", &mut self.retrieval.default_k);
        override_from_env("TESSERA_MAX_K", &mut self.retrieval.max_k);
        override_from_env(
            "TESSERA_MAX_QUERY_LENGTH",
            &mut self.retrieval.max_query_length,
        );
        override_from_env(
            "TESSERA_MEMORY_BLEND_ALPHA",
            &mut self.retrieval.memory_blend_alpha,
        );
        override_from_env(
            "TESSERA_PATH_HINT_BOOST",
            &mut self.retrieval.path_hint_boost,
        );

        override_from_env("TESSERA_MAX_TURNS", &mut self.memory.max_turns);

        if let Ok(data_dir) = env::var("TESSERA_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(data_dir);
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let indexing = &self.indexing;
        if indexing.max_tokens < ChunkPolicy::MIN_MAX_TOKENS {
            return Err(TesseraError::ConfigError(format!(
                "max_tokens must be at least {}",
                ChunkPolicy::MIN_MAX_TOKENS
            )));
        }

        if indexing.overlap_tokens > indexing.max_tokens / 3 {
            return Err(TesseraError::ConfigError(
                "overlap_tokens cannot exceed a third of max_tokens".to_string(),
            ));
        }

        if indexing.hard_max_chars < ChunkPolicy::MIN_HARD_MAX_CHARS {
            return Err(TesseraError::ConfigError(format!(
                "hard_max_chars must be at least {}",
                ChunkPolicy::MIN_HARD_MAX_CHARS
            )));
        }

        if indexing.sample_chars == 0 {
            return Err(TesseraError::ConfigError(
                "sample_chars must be non-zero".to_string(),
            ));
        }

        let retrieval = &self.retrieval;
        if retrieval.default_k == 0 {
            return Err(TesseraError::ConfigError(
                "Default k must be non-zero".to_string(),
            ));
        }

        if retrieval.default_k > retrieval.max_k {
            return Err(TesseraError::ConfigError(
                "Default k cannot exceed max k".to_string(),
            ));
        }

        if retrieval.max_query_length == 0 {
            return Err(TesseraError::ConfigError(
                "Max query length must be non-zero".to_string(),
            ));
        }

        if !(retrieval.memory_blend_alpha > 0.0 && retrieval.memory_blend_alpha <= 1.0) {
            return Err(TesseraError::ConfigError(
                "memory_blend_alpha must be in (0, 1]".to_string(),
            ));
        }

        if !retrieval.path_hint_boost.is_finite() || retrieval.path_hint_boost < 0.0 {
            return Err(TesseraError::ConfigError(
                "path_hint_boost must be a non-negative number".to_string(),
            ));
        }

        if self.memory.max_turns == 0 {
            return Err(TesseraError::ConfigError(
                "max_turns must be non-zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Log configuration
    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Max tokens: {}", self.indexing.max_tokens);
        tracing::info!("  Overlap tokens: {}", self.indexing.overlap_tokens);
        tracing::info!("  Hard max chars: {}", self.indexing.hard_max_chars);
        tracing::info!("  Sample chars: {}", self.indexing.sample_chars);
        tracing::info!("  Max file size: {} MB", self.indexing.max_file_size_mb);
        tracing::info!(
            "  Include patterns: {} patterns",
            self.indexing.include_patterns.len()
        );
        tracing::info!(
            "  Exclude patterns: {} patterns",
            self.indexing.exclude_patterns.len()
        );
        tracing::info!("  Default k: {}", self.retrieval.default_k);
        tracing::info!("  Max k: {}", self.retrieval.max_k);
        tracing::info!("  Max query length: {}", self.retrieval.max_query_length);
        tracing::info!("  Memory blend alpha: {}", self.retrieval.memory_blend_alpha);
        tracing::info!("  Path hint boost: {}", self.retrieval.path_hint_boost);
        tracing::info!("  Max turns: {}", self.memory.max_turns);
        tracing::info!("  Data dir: {:?}", self.storage.data_dir);
    }
}
