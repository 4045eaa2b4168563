use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::database::connection::DEFAULT_DB_FILENAME;
use crate::database::DatabaseConnection;
use crate::segmentation::ChunkingOptions;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Language of the novel (ISO)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Language scenes are translated into (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Language model config
    #[serde(default)]
    pub llm: LlmConfig,

    /// Segmentation budgets
    #[serde(default)]
    pub segmentation: SegmentationConfig,

    /// SQLite database file, platform data dir when unset
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Language model provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    // @provider: Ollama
    #[default]
    Ollama,
    // @provider: Anthropic
    Anthropic,
}

impl LlmProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ollama => "Ollama",
            Self::Anthropic => "Anthropic",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Ollama => "ollama".to_string(),
            Self::Anthropic => "anthropic".to_string(),
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "anthropic" => Ok(Self::Anthropic),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: LlmProvider) -> Self {
        match provider_type {
            LlmProvider::Ollama => Self {
                provider_type: "ollama".to_string(),
                model: default_ollama_model(),
                api_key: String::new(),
                endpoint: default_ollama_endpoint(),
                timeout_secs: default_timeout_secs(),
            },
            LlmProvider::Anthropic => Self {
                provider_type: "anthropic".to_string(),
                model: default_anthropic_model(),
                api_key: String::new(),
                endpoint: default_anthropic_endpoint(),
                timeout_secs: default_anthropic_timeout_secs(),
            },
        }
    }
}

/// Language model configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LlmConfig {
    /// Provider to use
    #[serde(default)]
    pub provider: LlmProvider,

    /// Available providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Settings shared by all providers
    #[serde(default)]
    pub common: LlmCommonConfig,
}

/// Settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LlmCommonConfig {
    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff base for retries (in milliseconds), doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for LlmCommonConfig {
    fn default() -> Self {
        Self {
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            temperature: default_temperature(),
        }
    }
}

/// Budgets of the segmentation engine
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SegmentationConfig {
    /// Nominal chunk size in tokens (4 chars per token)
    #[serde(default = "default_max_segment_tokens")]
    pub max_segment_tokens: usize,

    /// Hard character cap of a chunk, `max_prompt_chars` when unset
    #[serde(default)]
    pub max_chunk_chars: Option<usize>,

    /// Fraction of a chunk repeated at the start of the next one, in [0, 1)
    #[serde(default = "default_overlap_ratio")]
    pub overlap_ratio: f64,

    /// Longest sentence unit before forced splitting
    #[serde(default = "default_max_sentence_chars")]
    pub max_sentence_chars: usize,

    /// Character budget of one exercise prompt
    #[serde(default = "default_max_prompt_chars")]
    pub max_prompt_chars: usize,

    /// Character budget of one translation batch
    #[serde(default = "default_translation_batch_chars")]
    pub translation_batch_chars: usize,

    /// Sentence budget of one translation batch
    #[serde(default = "default_translation_batch_items")]
    pub translation_batch_items: usize,

    /// Questions kept per scene
    #[serde(default = "default_max_questions_per_scene")]
    pub max_questions_per_scene: usize,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            max_segment_tokens: default_max_segment_tokens(),
            max_chunk_chars: None,
            overlap_ratio: default_overlap_ratio(),
            max_sentence_chars: default_max_sentence_chars(),
            max_prompt_chars: default_max_prompt_chars(),
            translation_batch_chars: default_translation_batch_chars(),
            translation_batch_items: default_translation_batch_items(),
            max_questions_per_scene: default_max_questions_per_scene(),
        }
    }
}

impl SegmentationConfig {
    /// Chunker options derived from these budgets
    pub fn chunking_options(&self) -> ChunkingOptions {
        ChunkingOptions {
            max_tokens: self.max_segment_tokens,
            overlap_ratio: self.overlap_ratio,
            max_chunk_chars: Some(self.max_chunk_chars.unwrap_or(self.max_prompt_chars)),
        }
    }

    /// Check budgets for consistency
    pub fn validate(&self) -> Result<()> {
        let sizes = [
            ("max_segment_tokens", self.max_segment_tokens),
            ("max_sentence_chars", self.max_sentence_chars),
            ("max_prompt_chars", self.max_prompt_chars),
            ("translation_batch_chars", self.translation_batch_chars),
            ("translation_batch_items", self.translation_batch_items),
            ("max_questions_per_scene", self.max_questions_per_scene),
        ];
        if let Some((name, _)) = sizes.iter().find(|(_, value)| *value == 0) {
            return Err(anyhow!("segmentation.{} must be greater than 0", name));
        }
        if self.max_chunk_chars == Some(0) {
            return Err(anyhow!("segmentation.max_chunk_chars must be greater than 0 when set"));
        }
        if !(0.0..1.0).contains(&self.overlap_ratio) {
            return Err(anyhow!(
                "segmentation.overlap_ratio must be in [0, 1), got {}",
                self.overlap_ratio
            ));
        }
        if self.max_sentence_chars > self.translation_batch_chars {
            return Err(anyhow!(
                "segmentation.max_sentence_chars ({}) exceeds translation_batch_chars ({})",
                self.max_sentence_chars,
                self.translation_batch_chars
            ));
        }
        if self.max_sentence_chars > self.max_prompt_chars {
            return Err(anyhow!(
                "segmentation.max_sentence_chars ({}) exceeds max_prompt_chars ({})",
                self.max_sentence_chars,
                self.max_prompt_chars
            ));
        }
        Ok(())
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    // @returns: Matching `log` filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    "fr".to_string()
}

fn default_target_language() -> String {
    "en".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_anthropic_timeout_secs() -> u64 {
    60
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000 // doubled on each retry
}

fn default_temperature() -> f32 {
    0.2
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:3b".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-haiku-20240307".to_string()
}

fn default_max_segment_tokens() -> usize {
    512
}

fn default_overlap_ratio() -> f64 {
    0.1
}

fn default_max_sentence_chars() -> usize {
    1000
}

fn default_max_prompt_chars() -> usize {
    4000
}

fn default_translation_batch_chars() -> usize {
    4000
}

fn default_translation_batch_items() -> usize {
    100
}

fn default_max_questions_per_scene() -> usize {
    4
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate languages
        let _source_name = crate::language_utils::get_language_name(&self.source_language)?;
        let _target_name = crate::language_utils::get_language_name(&self.target_language)?;

        if self.llm.provider == LlmProvider::Anthropic && self.llm.get_api_key().is_empty() {
            return Err(anyhow!("API key is required for Anthropic provider"));
        }

        if !(0.0..=1.0).contains(&self.llm.common.temperature) {
            return Err(anyhow!(
                "Temperature must be between 0.0 and 1.0, got {}",
                self.llm.common.temperature
            ));
        }

        self.segmentation.validate()
    }

    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Write the configuration as pretty JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Database file in use
    pub fn resolved_database_path(&self) -> PathBuf {
        match &self.database_path {
            Some(path) => path.clone(),
            None => DatabaseConnection::default_database_path()
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DB_FILENAME)),
        }
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            llm: LlmConfig::default(),
            segmentation: SegmentationConfig::default(),
            database_path: None,
            log_level: LogLevel::default(),
        }
    }
}

impl LlmConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        let provider_str = self.provider.to_lowercase_string();
        self.available_providers
            .iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Mutable access to the active provider configuration, created when missing
    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider_str = self.provider.to_lowercase_string();
        let position = match self.available_providers.iter().position(|p| p.provider_type == provider_str) {
            Some(position) => position,
            None => {
                self.available_providers.push(ProviderConfig::new(self.provider.clone()));
                self.available_providers.len() - 1
            }
        };
        &mut self.available_providers[position]
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        match self.provider {
            LlmProvider::Ollama => default_ollama_model(),
            LlmProvider::Anthropic => default_anthropic_model(),
        }
    }

    /// Get the API key for the active provider
    pub fn get_api_key(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.api_key.clone())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        match self.provider {
            LlmProvider::Ollama => default_ollama_endpoint(),
            LlmProvider::Anthropic => default_anthropic_endpoint(),
        }
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        match self.get_active_provider_config() {
            Some(provider_config) if provider_config.timeout_secs > 0 => provider_config.timeout_secs,
            _ => default_timeout_secs(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            available_providers: vec![
                ProviderConfig::new(LlmProvider::Ollama),
                ProviderConfig::new(LlmProvider::Anthropic),
            ],
            common: LlmCommonConfig::default(),
        }
    }
}
