//! The factory pipeline and the controller that re-runs it.

mod factory_pipeline;
mod revision;

pub use factory_pipeline::{
    FactoryPipeline, PipelineOutcome, PipelineRequest, DEFAULT_QUALITY_THRESHOLD,
};
pub use revision::{
    AttemptDecision, Rerun, RerunOutcome, RevisionController, RevisionPolicy, DEFAULT_MAX_ATTEMPTS,
};
