/*!
 * Tests for app configuration functionality
 */

use anyhow::Result;
use std::path::PathBuf;

use novelscene::app_config::{Config, LlmProvider, LogLevel, SegmentationConfig};

use crate::common;

/// Test default configuration values
#[test]
fn test_config_default_shouldHaveExpectedValues() {
    let config = Config::default();

    assert_eq!(config.source_language, "fr");
    assert_eq!(config.target_language, "en");
    assert_eq!(config.llm.provider, LlmProvider::Ollama);
    assert_eq!(config.llm.get_model(), "llama3.2:3b");
    assert_eq!(config.llm.get_endpoint(), "http://localhost:11434");
    assert_eq!(config.llm.common.retry_count, 3);
    assert_eq!(config.log_level, LogLevel::Info);
    assert_eq!(config.segmentation, SegmentationConfig::default());
    assert!(config.validate().is_ok());
}

/// Test that Anthropic requires an API key
#[test]
fn test_config_validate_anthropicWithoutKey_shouldFail() {
    let mut config = Config::default();
    config.llm.provider = LlmProvider::Anthropic;
    assert!(config.validate().is_err());

    config.llm.active_provider_config_mut().api_key = "sk-test".to_string();
    assert!(config.validate().is_ok());
    assert_eq!(config.llm.get_model(), "claude-3-haiku-20240307");
}

#[test]
fn test_config_validate_shouldRejectBadLanguageAndTemperature() {
    let mut config = Config::default();
    config.source_language = "xx".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.llm.common.temperature = 1.5;
    assert!(config.validate().is_err());
}

/// Test budget consistency checks
#[test]
fn test_segmentationConfig_validate_shouldRejectInconsistentBudgets() {
    let mut config = SegmentationConfig::default();
    config.max_sentence_chars = 5000;
    assert!(config.validate().is_err());

    let mut config = SegmentationConfig::default();
    config.translation_batch_items = 0;
    assert!(config.validate().is_err());

    let mut config = SegmentationConfig::default();
    config.max_chunk_chars = Some(0);
    assert!(config.validate().is_err());

    let mut config = SegmentationConfig::default();
    config.overlap_ratio = -0.1;
    assert!(config.validate().is_err());
}

/// Test saving and loading a configuration file
#[test]
fn test_config_saveAndLoad_shouldPreserveValues() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let mut config = Config::default();
    config.source_language = "de".to_string();
    config.database_path = Some(PathBuf::from("/tmp/books.db"));
    config.segmentation.max_prompt_chars = 2500;
    config.save_to_file(&path)?;

    let loaded = Config::from_file(&path)?;

    assert_eq!(loaded.source_language, "de");
    assert_eq!(loaded.segmentation.max_prompt_chars, 2500);
    assert_eq!(loaded.resolved_database_path(), PathBuf::from("/tmp/books.db"));
    assert_eq!(loaded.llm.available_providers.len(), 2);
    Ok(())
}

#[test]
fn test_config_fromFile_invalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json")?;

    assert!(Config::from_file(&path).is_err());
    assert!(Config::from_file(temp_dir.path().join("missing.json")).is_err());
    Ok(())
}

#[test]
fn test_config_providerSerialization_shouldUseLowercaseNames() -> Result<()> {
    let json = serde_json::to_string(&Config::default())?;

    assert!(json.contains("\"provider\":\"ollama\""));
    assert!(json.contains("\"type\":\"anthropic\""));
    Ok(())
}

#[test]
fn test_config_resolvedDatabasePath_withoutOverride_shouldUseDataDirectory() {
    let config = Config::default();

    let path = config.resolved_database_path();

    assert!(path.ends_with("novelscene.db"));
    if let Ok(default_path) = novelscene::database::DatabaseConnection::default_database_path() {
        assert_eq!(path, default_path);
    }
}
