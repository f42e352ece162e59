//! Pipeline stages, in execution order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of the factory pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    ContentAnalysis,
    Extraction,
    ExtractionValidation,
    Design,
    DesignValidation,
    ContextBuild,
    Generation,
    OutputValidation,
    QualityGate,
}

impl PipelineStage {
    pub const ORDER: [PipelineStage; 9] = [
        PipelineStage::ContentAnalysis,
        PipelineStage::Extraction,
        PipelineStage::ExtractionValidation,
        PipelineStage::Design,
        PipelineStage::DesignValidation,
        PipelineStage::ContextBuild,
        PipelineStage::Generation,
        PipelineStage::OutputValidation,
        PipelineStage::QualityGate,
    ];

    /// The stage that runs after this one, if any.
    pub fn next(&self) -> Option<PipelineStage> {
        let idx = Self::ORDER.iter().position(|s| s == self)?;
        Self::ORDER.get(idx + 1).copied()
    }

    /// Name used for AI budget lookup and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::ContentAnalysis => "content_analysis",
            PipelineStage::Extraction => "extraction",
            PipelineStage::ExtractionValidation => "extraction_validation",
            PipelineStage::Design => "design",
            PipelineStage::DesignValidation => "design_validation",
            PipelineStage::ContextBuild => "context_build",
            PipelineStage::Generation => "generation",
            PipelineStage::OutputValidation => "output_validation",
            PipelineStage::QualityGate => "quality_gate",
        }
    }

    /// True for stages that call the AI gateway.
    pub fn calls_ai(&self) -> bool {
        matches!(
            self,
            PipelineStage::ContentAnalysis
                | PipelineStage::Extraction
                | PipelineStage::Design
                | PipelineStage::Generation
        )
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_chain_in_order() {
        let mut stage = PipelineStage::ContentAnalysis;
        let mut visited = vec![stage];
        while let Some(next) = stage.next() {
            visited.push(next);
            stage = next;
        }
        assert_eq!(visited, PipelineStage::ORDER.to_vec());
        assert_eq!(stage, PipelineStage::QualityGate);
    }

    #[test]
    fn only_generative_stages_call_ai() {
        let ai_stages: Vec<_> = PipelineStage::ORDER.iter().filter(|s| s.calls_ai()).collect();
        assert_eq!(ai_stages.len(), 4);
        assert!(!PipelineStage::OutputValidation.calls_ai());
    }
}
