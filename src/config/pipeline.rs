//! Pipeline configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Pass limit and quality gate
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Pipeline passes per job before escalation (submission counts as one)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Minimum quality score, 0..=100
    #[serde(default = "default_quality_threshold")]
    pub quality_threshold: u32,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_attempts == 0 {
            return Err(ValidationError::InvalidMaxAttempts);
        }
        if self.quality_threshold > 100 {
            return Err(ValidationError::InvalidQualityThreshold(self.quality_threshold));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            quality_threshold: default_quality_threshold(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_quality_threshold() -> u32 {
    70
}
