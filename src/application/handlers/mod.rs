//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod job;

pub use job::{
    // Commands
    ApproveJobCommand, CancelJobCommand, RejectJobCommand, RequestRevisionCommand,
    RetryJobCommand, SubmitJobCommand,
    // Handlers
    ApproveJobHandler, CancelJobHandler, GetJobHandler, RejectJobHandler,
    RequestRevisionHandler, RetryJobHandler, SubmitJobHandler,
    // Queries and results
    ApproveJobResult, GetJobQuery, JobView, SubmitJobResult,
};
