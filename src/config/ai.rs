//! AI provider configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// AI provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// OpenAI API key
    pub openai_api_key: Option<String>,

    /// Anthropic API key
    pub anthropic_api_key: Option<String>,

    /// Provider tried first by the gateway
    #[serde(default = "default_provider")]
    pub primary_provider: AiProvider,

    /// Provider tried when the primary fails; defaults to the other one
    pub fallback_provider: Option<AiProvider>,

    /// Model override for OpenAI
    pub openai_model: Option<String>,

    /// Model override for Anthropic
    pub anthropic_model: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Provider-level retries for retryable errors
    #[serde(default = "default_retries")]
    pub max_retries: u32,
}

/// AI provider type
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    OpenAI,
    #[default]
    Anthropic,
}

impl AiProvider {
    pub fn other(&self) -> AiProvider {
        match self {
            AiProvider::OpenAI => AiProvider::Anthropic,
            AiProvider::Anthropic => AiProvider::OpenAI,
        }
    }
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if OpenAI is configured
    pub fn has_openai(&self) -> bool {
        self.openai_api_key.as_ref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Check if Anthropic is configured
    pub fn has_anthropic(&self) -> bool {
        self.anthropic_api_key.as_ref().is_some_and(|k| !k.trim().is_empty())
    }

    pub fn has_key_for(&self, provider: AiProvider) -> bool {
        match provider {
            AiProvider::OpenAI => self.has_openai(),
            AiProvider::Anthropic => self.has_anthropic(),
        }
    }

    /// Provider serving as the gateway's secondary.
    pub fn secondary_provider(&self) -> AiProvider {
        self.fallback_provider
            .filter(|p| *p != self.primary_provider)
            .unwrap_or_else(|| self.primary_provider.other())
    }

    /// Validate AI configuration
    ///
    /// A primary without a key is allowed; the gateway then routes every
    /// call to the secondary.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_openai() && !self.has_anthropic() {
            return Err(ValidationError::NoAiProviderConfigured);
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            anthropic_api_key: None,
            primary_provider: default_provider(),
            fallback_provider: None,
            openai_model: None,
            anthropic_model: None,
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
        }
    }
}

fn default_provider() -> AiProvider {
    AiProvider::Anthropic
}

fn default_timeout() -> u64 {
    120
}

fn default_retries() -> u32 {
    2
}
