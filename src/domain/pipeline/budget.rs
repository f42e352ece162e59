//! Per-stage token budgets for AI calls.

use super::PipelineStage;

/// Rough chars-per-token ratio used for pre-flight estimates.
pub const CHARS_PER_TOKEN: usize = 4;

/// Input ceiling and default output allowance for one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageBudget {
    /// Maximum estimated input tokens (system + user prompt).
    pub max_input_tokens: u32,
    /// Output tokens requested when the caller does not say otherwise.
    pub max_output_tokens: u32,
}

impl StageBudget {
    pub const fn new(max_input_tokens: u32, max_output_tokens: u32) -> Self {
        Self {
            max_input_tokens,
            max_output_tokens,
        }
    }

    /// Budget by stage name. Unknown names get the default row.
    pub fn for_stage_name(name: &str) -> Self {
        match name {
            "content_analysis" => Self::new(30_000, 2_000),
            "extraction" => Self::new(30_000, 4_000),
            "design" => Self::new(20_000, 4_000),
            "generation" => Self::new(40_000, 16_000),
            _ => Self::default(),
        }
    }

    pub fn for_stage(stage: PipelineStage) -> Self {
        Self::for_stage_name(stage.as_str())
    }

    pub fn admits(&self, estimated_input_tokens: u32) -> bool {
        estimated_input_tokens <= self.max_input_tokens
    }
}

impl Default for StageBudget {
    fn default() -> Self {
        Self::new(20_000, 4_000)
    }
}

/// chars / 4, never below 1.
pub fn estimate_tokens(text: &str) -> u32 {
    let tokens = text.chars().count() / CHARS_PER_TOKEN;
    u32::try_from(tokens).unwrap_or(u32::MAX).max(1)
}
