//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `TOOL_FACTORY` prefix
//! and nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use tool_factory::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Quality threshold: {}", config.pipeline.quality_threshold);
//! ```

mod ai;
mod error;
mod log;
mod pipeline;

pub use ai::{AiConfig, AiProvider};
pub use error::{ConfigError, ValidationError};
pub use log::LogConfig;
pub use pipeline::PipelineConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults; only an AI key is needed for a valid config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// AI provider configuration (OpenAI/Anthropic)
    #[serde(default)]
    pub ai: AiConfig,

    /// Pass limit and quality gate
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Log level and format
    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `TOOL_FACTORY` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `TOOL_FACTORY__AI__ANTHROPIC_API_KEY=...` -> `ai.anthropic_api_key`
    /// - `TOOL_FACTORY__PIPELINE__MAX_ATTEMPTS=5` -> `pipeline.max_attempts = 5`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("TOOL_FACTORY")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ai.validate()?;
        self.pipeline.validate()?;
        self.log.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 5] = [
        "TOOL_FACTORY__AI__ANTHROPIC_API_KEY",
        "TOOL_FACTORY__AI__PRIMARY_PROVIDER",
        "TOOL_FACTORY__PIPELINE__MAX_ATTEMPTS",
        "TOOL_FACTORY__PIPELINE__QUALITY_THRESHOLD",
        "TOOL_FACTORY__LOG__JSON",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("TOOL_FACTORY__AI__ANTHROPIC_API_KEY", "sk-ant-xxx");
        env::set_var("TOOL_FACTORY__AI__PRIMARY_PROVIDER", "openai");
        env::set_var("TOOL_FACTORY__PIPELINE__MAX_ATTEMPTS", "5");
        env::set_var("TOOL_FACTORY__LOG__JSON", "true");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.ai.anthropic_api_key.as_deref(), Some("sk-ant-xxx"));
        assert_eq!(config.ai.primary_provider, AiProvider::OpenAI);
        assert_eq!(config.pipeline.max_attempts, 5);
        assert_eq!(config.pipeline.quality_threshold, 70);
        assert!(config.log.json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_without_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert_eq!(config.pipeline.max_attempts, 3);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_validate_requires_a_provider_key() {
        let config = AppConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::NoAiProviderConfigured)
        ));
    }

    #[test]
    fn test_invalid_threshold_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("TOOL_FACTORY__AI__ANTHROPIC_API_KEY", "sk-ant-xxx");
        env::set_var("TOOL_FACTORY__PIPELINE__QUALITY_THRESHOLD", "150");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidQualityThreshold(150))
        ));
    }
}
