//! Knowledge module - what the pipeline learns from content and how it
//! shapes a tool.
//!
//! - `CourseAnalysis` - extraction result
//! - `ToolDesign` - inputs, verdict block and deep-content hints
//! - `Phase` - wizard steps for the multi-phase variant
//! - `ContentInsights` - content-analysis summary

mod analysis;
mod design;
mod insights;
mod phase;

pub use analysis::{
    CourseAnalysis, DecisionCriteria, ExpertQuote, Formula, Framework, FrameworkItem, Term,
};
pub use design::{DecisionBlock, DeepContentHints, InputField, InputType, Threshold, ToolDesign};
pub use insights::ContentInsights;
pub use phase::{BranchCondition, Phase, MAX_INPUTS_PER_PHASE, MAX_PHASES, MIN_PHASES};
