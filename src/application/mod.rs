//! Application layer - the job state machine, the factory pipeline and the
//! trigger handlers.
//!
//! Handlers are the only entry points. Every status change they cause goes
//! through [`JobStateMachine`]; pipeline-starting triggers hold a
//! [`JobLease`] for the job until the background pass finishes.

pub mod handlers;
pub mod pipeline;

mod job_leases;
mod job_state_machine;

pub use handlers::{
    ApproveJobCommand, ApproveJobHandler, ApproveJobResult, CancelJobCommand, CancelJobHandler,
    GetJobHandler, GetJobQuery, JobView, RejectJobCommand, RejectJobHandler,
    RequestRevisionCommand, RequestRevisionHandler, RetryJobCommand, RetryJobHandler,
    SubmitJobCommand, SubmitJobHandler, SubmitJobResult,
};
pub use job_leases::{JobLease, JobLeases};
pub use job_state_machine::JobStateMachine;
pub use pipeline::{
    FactoryPipeline, PipelineOutcome, PipelineRequest, Rerun, RerunOutcome, RevisionController,
    RevisionPolicy,
};
