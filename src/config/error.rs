//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("No AI provider configured")]
    NoAiProviderConfigured,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("max_attempts must be at least 1")]
    InvalidMaxAttempts,

    #[error("Quality threshold {0} is outside 0..=100")]
    InvalidQualityThreshold(u32),

    #[error("Invalid log filter: {0}")]
    InvalidLogLevel(String),
}
