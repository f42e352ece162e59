//! Job trigger handlers, one per operation on the trigger interface.

mod approve_job;
mod cancel_job;
mod get_job;
mod reject_job;
mod request_revision;
mod retry_job;
mod submit_job;

pub use approve_job::{ApproveJobCommand, ApproveJobHandler, ApproveJobResult};
pub use cancel_job::{CancelJobCommand, CancelJobHandler};
pub use get_job::{GetJobHandler, GetJobQuery, JobView};
pub use reject_job::{RejectJobCommand, RejectJobHandler};
pub use request_revision::{RequestRevisionCommand, RequestRevisionHandler};
pub use retry_job::{RetryJobCommand, RetryJobHandler};
pub use submit_job::{SubmitJobCommand, SubmitJobHandler, SubmitJobResult};
